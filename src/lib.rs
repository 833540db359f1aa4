//! Virtual Sensor Bridge library.
//!
//! Splits the single AnalogInput report stream of PTVO-firmware Zigbee
//! devices into typed virtual sensors (temperature, humidity, pressure,
//! counter) using the unit tag reported alongside each measurement.

pub mod attribute_cache;
pub mod clusters;
pub mod config;
pub mod device;
pub mod error;
pub mod input;
pub mod sensors;

pub use attribute_cache::{AttributeCache, AttributePath, MemoryAttributeCache};
pub use clusters::{AttributeReport, AttributeValue, QuantityKind};
pub use device::{DeviceTopology, MultiSensorDevice};
pub use error::{BridgeError, Result};
