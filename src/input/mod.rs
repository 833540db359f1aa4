//! Input sources that deliver attribute reports to a device.
//!
//! Current input sources:
//! - `mqtt`: live reports published by the host gateway
//! - `reports`: JSON payload decoding shared with the replay tool

pub mod mqtt;
pub mod reports;
