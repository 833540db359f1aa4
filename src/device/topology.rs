//! Static endpoint topology for PTVO devices.
//!
//! A topology says, per physical endpoint, how its analog-input reports are
//! bound to quantities and which virtual sensors replace it on the host.
//! New device variants are added as data, either as a built-in profile or
//! as a JSON file.

use crate::clusters::{EndpointBinding, QuantityKind};
use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use strum::Display;

/// Zigbee manufacturer string PTVO firmware reports in its basic cluster.
pub const PTVO_MANUFACTURER: &str = "ptvo.test1";

/// Zigbee model string PTVO firmware reports in its basic cluster.
pub const PTVO_MODEL: &str = "ptvo.swich.64991";

/// Host device type an endpoint appears as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    #[default]
    TemperatureSensor,
    MeterInterface,
}

/// One physical endpoint and the virtual sensors it feeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointTopology {
    pub endpoint_id: u8,
    #[serde(default)]
    pub device_type: DeviceType,
    #[serde(default)]
    pub binding: EndpointBinding,
    pub virtual_sensors: Vec<QuantityKind>,
}

impl EndpointTopology {
    pub fn new(endpoint_id: u8, binding: EndpointBinding, virtual_sensors: &[QuantityKind]) -> Self {
        Self {
            endpoint_id,
            device_type: DeviceType::TemperatureSensor,
            binding,
            virtual_sensors: virtual_sensors.to_vec(),
        }
    }

    pub fn with_device_type(mut self, device_type: DeviceType) -> Self {
        self.device_type = device_type;
        self
    }
}

/// Endpoint layout of a device model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceTopology {
    pub manufacturer: String,
    pub model: String,
    pub endpoints: Vec<EndpointTopology>,
}

impl DeviceTopology {
    /// PTVO multi-sensor: two thermometers, humidity, pressure and a counter.
    ///
    /// Endpoint 1 carries humidity and temperature, endpoint 3 temperature and
    /// pressure, and endpoint 4 is a pulse counter that never sends a unit tag.
    pub fn ptvo() -> Self {
        use QuantityKind::*;
        Self {
            manufacturer: PTVO_MANUFACTURER.to_string(),
            model: PTVO_MODEL.to_string(),
            endpoints: vec![
                EndpointTopology::new(1, EndpointBinding::UnitTag, &[Humidity, Temperature]),
                EndpointTopology::new(3, EndpointBinding::UnitTag, &[Temperature, Pressure]),
                EndpointTopology::new(4, EndpointBinding::Fixed(Counter), &[Counter])
                    .with_device_type(DeviceType::MeterInterface),
            ],
        }
    }

    /// Older two-endpoint PTVO firmware layout.
    ///
    /// Endpoint 1 reports humidity without a unit tag; endpoint 2 is a
    /// thermometer tagged with "C".
    pub fn ptvo_legacy() -> Self {
        use QuantityKind::*;
        Self {
            manufacturer: PTVO_MANUFACTURER.to_string(),
            model: PTVO_MODEL.to_string(),
            endpoints: vec![
                EndpointTopology::new(1, EndpointBinding::Fixed(Humidity), &[Humidity]),
                EndpointTopology::new(2, EndpointBinding::UnitTag, &[Temperature]),
            ],
        }
    }

    /// Look up a built-in profile by name.
    pub fn from_profile(name: &str) -> Result<Self> {
        match name {
            "ptvo" => Ok(Self::ptvo()),
            "ptvo-legacy" => Ok(Self::ptvo_legacy()),
            other => Err(BridgeError::UnknownProfile(other.to_string())),
        }
    }

    /// Load and validate a topology from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let topology: Self = serde_json::from_str(&content)?;
        topology.validate()?;
        Ok(topology)
    }

    pub fn endpoint(&self, endpoint_id: u8) -> Option<&EndpointTopology> {
        self.endpoints.iter().find(|e| e.endpoint_id == endpoint_id)
    }

    /// Reject layouts the device assembly cannot wire unambiguously.
    pub fn validate(&self) -> Result<()> {
        if self.endpoints.is_empty() {
            return Err(BridgeError::InvalidTopology(
                "at least one endpoint is required".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        for endpoint in &self.endpoints {
            if !seen.insert(endpoint.endpoint_id) {
                return Err(BridgeError::DuplicateEndpoint(endpoint.endpoint_id));
            }

            let mut kinds = BTreeSet::new();
            for kind in &endpoint.virtual_sensors {
                if !kinds.insert(*kind) {
                    return Err(BridgeError::InvalidTopology(format!(
                        "endpoint {} declares {} twice",
                        endpoint.endpoint_id, kind
                    )));
                }
            }

            if endpoint.virtual_sensors.contains(&QuantityKind::Counter)
                && endpoint.binding != EndpointBinding::Fixed(QuantityKind::Counter)
            {
                return Err(BridgeError::InvalidTopology(format!(
                    "endpoint {} exposes a counter but is not bound to one",
                    endpoint.endpoint_id
                )));
            }
        }

        Ok(())
    }
}
