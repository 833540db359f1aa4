//! MQTT input source for gateway attribute reports.
//!
//! The host gateway publishes decoded AnalogInput reports as JSON on a
//! topic; this module subscribes and hands them to a device.

mod client;
mod integration;

pub use client::{MqttClient, MqttMessage};
pub use integration::{MqttIntegration, apply_payload, pump_messages};
