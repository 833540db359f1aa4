//! Zigbee cluster handling for PTVO multi-sensor devices.
//!
//! PTVO firmware pushes every physical quantity through the AnalogInput
//! cluster (0x000C) and tags it with a companion unit report. This module
//! decodes those reports (`units`) and routes them per endpoint
//! (`analog_input`) to the typed measurement clusters the host exposes.

use serde::{Deserialize, Serialize};
use strum::{Display, FromRepr};

pub mod analog_input;
pub mod units;

pub use analog_input::{AnalogInputRouter, EndpointBinding};
pub use units::{Classification, QuantityKind, classify};

/// AnalogInput `PresentValue` attribute: the measured number.
pub const PRESENT_VALUE_ATTRIBUTE: u16 = 0x0055;

/// AnalogInput attribute carrying the unit tag text ("C", "%", "Pa", ...).
pub const UNIT_TAG_ATTRIBUTE: u16 = 0x001C;

/// `MeasuredValue` attribute of the measurement clusters.
pub const MEASURED_VALUE_ATTRIBUTE: u16 = 0x0000;

/// Clusters the bridge reads from or writes to in the host attribute cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, FromRepr, Display)]
#[derive(Serialize, Deserialize)]
#[repr(u16)]
pub enum ClusterKind {
    /// Raw report stream from the device
    AnalogInput = 0x000C,
    /// Counter / generic value output
    AnalogOutput = 0x000D,
    /// Temperature in centidegrees Celsius
    TemperatureMeasurement = 0x0402,
    /// Pressure
    PressureMeasurement = 0x0403,
    /// Relative humidity in centi-percent
    RelativeHumidity = 0x0405,
}

impl ClusterKind {
    /// Zigbee cluster identifier.
    pub fn cluster_id(self) -> u16 {
        self as u16
    }
}

/// Value carried by an attribute report or stored in the attribute cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
}

impl AttributeValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            AttributeValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            AttributeValue::Number(_) => None,
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

/// One decoded attribute report delivered by the host transport.
///
/// A `None` value is the no-data sentinel; such reports never change state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeReport {
    pub endpoint_id: u8,
    pub attribute_id: u16,
    #[serde(default)]
    pub value: Option<AttributeValue>,
}

impl AttributeReport {
    pub fn new(endpoint_id: u8, attribute_id: u16, value: impl Into<AttributeValue>) -> Self {
        Self {
            endpoint_id,
            attribute_id,
            value: Some(value.into()),
        }
    }

    /// Report carrying the no-data sentinel.
    pub fn absent(endpoint_id: u8, attribute_id: u16) -> Self {
        Self {
            endpoint_id,
            attribute_id,
            value: None,
        }
    }

    /// `PresentValue` report.
    pub fn measurement(endpoint_id: u8, value: f64) -> Self {
        Self::new(endpoint_id, PRESENT_VALUE_ATTRIBUTE, value)
    }

    /// Unit tag report.
    pub fn unit_tag(endpoint_id: u8, tag: &str) -> Self {
        Self::new(endpoint_id, UNIT_TAG_ATTRIBUTE, tag)
    }
}
