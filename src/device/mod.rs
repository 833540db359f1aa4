//! Device assemblies built from static endpoint topologies.

pub mod multi_sensor;
pub mod topology;

pub use multi_sensor::MultiSensorDevice;
pub use topology::{DeviceTopology, DeviceType, EndpointTopology};
