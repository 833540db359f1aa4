//! Unit decoding for the PTVO analog-input report stream.
//!
//! Every report on the AnalogInput cluster is either a measurement
//! (`PresentValue`, scaled to hundredths), a unit tag naming the quantity
//! of the last measurement, or something the router does not care about.

use super::{
    AttributeValue, ClusterKind, MEASURED_VALUE_ATTRIBUTE, PRESENT_VALUE_ATTRIBUTE,
    UNIT_TAG_ATTRIBUTE,
};
use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Devices report engineering-unit floats; the host works in hundredths.
pub const MEASUREMENT_SCALE: f64 = 100.0;

/// Pressure arrives pre-scaled by the firmware and needs compensating.
pub const PRESSURE_DIVISOR: f64 = 10_000.0;

/// Semantic category of a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityKind {
    Temperature,
    Humidity,
    Pressure,
    Counter,
}

impl QuantityKind {
    /// Classify a unit tag by prefix: `%` humidity, `C` temperature, `Pa` pressure.
    ///
    /// Counters carry no unit tag, so they are never returned here.
    pub fn from_unit_tag(tag: &str) -> Option<Self> {
        if tag.starts_with('%') {
            Some(QuantityKind::Humidity)
        } else if tag.starts_with('C') {
            Some(QuantityKind::Temperature)
        } else if tag.starts_with("Pa") {
            Some(QuantityKind::Pressure)
        } else {
            None
        }
    }

    /// Divisor applied to the buffered measurement when a unit tag arrives.
    pub fn unit_divisor(self) -> f64 {
        match self {
            QuantityKind::Pressure => PRESSURE_DIVISOR,
            _ => 1.0,
        }
    }

    /// Host cluster exposing this quantity.
    pub fn cluster(self) -> ClusterKind {
        match self {
            QuantityKind::Temperature => ClusterKind::TemperatureMeasurement,
            QuantityKind::Humidity => ClusterKind::RelativeHumidity,
            QuantityKind::Pressure => ClusterKind::PressureMeasurement,
            QuantityKind::Counter => ClusterKind::AnalogOutput,
        }
    }

    /// Attribute slot the virtual sensor writes in its host cluster.
    pub fn value_attribute(self) -> u16 {
        match self {
            QuantityKind::Counter => PRESENT_VALUE_ATTRIBUTE,
            _ => MEASURED_VALUE_ATTRIBUTE,
        }
    }
}

/// What a single analog-input report means to the router.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// New reading, already scaled to hundredths
    MeasurementUpdate(f64),
    /// Unit tag text for the last reading
    UnitTag(String),
    /// Not routed; only kept in the generic attribute cache
    Ignored,
}

/// Classify a non-absent report value by attribute identifier.
///
/// A value of the wrong type for a known attribute breaks the host contract
/// and is returned as an error instead of being guessed at.
pub fn classify(attribute_id: u16, value: &AttributeValue) -> Result<Classification> {
    match attribute_id {
        PRESENT_VALUE_ATTRIBUTE => value
            .as_number()
            .map(|v| Classification::MeasurementUpdate(v * MEASUREMENT_SCALE))
            .ok_or(BridgeError::UnexpectedValueType {
                attribute_id,
                expected: "numeric",
            }),
        UNIT_TAG_ATTRIBUTE => value
            .as_text()
            .map(|tag| Classification::UnitTag(tag.to_string()))
            .ok_or(BridgeError::UnexpectedValueType {
                attribute_id,
                expected: "text",
            }),
        _ => Ok(Classification::Ignored),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_value_is_scaled() {
        let c = classify(PRESENT_VALUE_ATTRIBUTE, &AttributeValue::Number(21.5)).unwrap();
        assert_eq!(c, Classification::MeasurementUpdate(2150.0));
    }

    #[test]
    fn test_unit_tag_passes_text_through() {
        let c = classify(UNIT_TAG_ATTRIBUTE, &"C".into()).unwrap();
        assert_eq!(c, Classification::UnitTag("C".to_string()));
    }

    #[test]
    fn test_other_attributes_are_ignored() {
        let c = classify(0x0051, &AttributeValue::Number(1.0)).unwrap();
        assert_eq!(c, Classification::Ignored);
        let c = classify(0x0041, &"anything".into()).unwrap();
        assert_eq!(c, Classification::Ignored);
    }

    #[test]
    fn test_wrong_value_type_is_an_error() {
        assert!(matches!(
            classify(PRESENT_VALUE_ATTRIBUTE, &"21.5".into()),
            Err(BridgeError::UnexpectedValueType { attribute_id: 0x0055, .. })
        ));
        assert!(matches!(
            classify(UNIT_TAG_ATTRIBUTE, &AttributeValue::Number(1.0)),
            Err(BridgeError::UnexpectedValueType { attribute_id: 0x001C, .. })
        ));
    }

    #[test]
    fn test_unit_tags_match_by_prefix() {
        assert_eq!(QuantityKind::from_unit_tag("C"), Some(QuantityKind::Temperature));
        assert_eq!(QuantityKind::from_unit_tag("C,"), Some(QuantityKind::Temperature));
        assert_eq!(QuantityKind::from_unit_tag("%"), Some(QuantityKind::Humidity));
        assert_eq!(QuantityKind::from_unit_tag("%RH"), Some(QuantityKind::Humidity));
        assert_eq!(QuantityKind::from_unit_tag("Pa"), Some(QuantityKind::Pressure));
        assert_eq!(QuantityKind::from_unit_tag("Pa,2"), Some(QuantityKind::Pressure));
    }

    #[test]
    fn test_unknown_unit_tags() {
        assert_eq!(QuantityKind::from_unit_tag(""), None);
        assert_eq!(QuantityKind::from_unit_tag("V"), None);
        assert_eq!(QuantityKind::from_unit_tag("P"), None);
        assert_eq!(QuantityKind::from_unit_tag("c"), None);
    }

    #[test]
    fn test_only_pressure_is_divided() {
        assert_eq!(QuantityKind::Pressure.unit_divisor(), 10_000.0);
        assert_eq!(QuantityKind::Temperature.unit_divisor(), 1.0);
        assert_eq!(QuantityKind::Humidity.unit_divisor(), 1.0);
        assert_eq!(QuantityKind::Counter.unit_divisor(), 1.0);
    }

    #[test]
    fn test_each_kind_has_its_own_cluster() {
        use strum::IntoEnumIterator;
        let clusters: std::collections::BTreeSet<_> =
            QuantityKind::iter().map(QuantityKind::cluster).collect();
        assert_eq!(clusters.len(), 4);
    }

    #[test]
    fn test_host_slots() {
        assert_eq!(QuantityKind::Counter.cluster(), ClusterKind::AnalogOutput);
        assert_eq!(QuantityKind::Counter.value_attribute(), PRESENT_VALUE_ATTRIBUTE);
        assert_eq!(QuantityKind::Pressure.cluster(), ClusterKind::PressureMeasurement);
        assert_eq!(QuantityKind::Humidity.value_attribute(), MEASURED_VALUE_ATTRIBUTE);
    }
}
