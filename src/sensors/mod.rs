//! Virtual sensor state fed by the analog-input router.
//!
//! Routers publish typed [`Event`]s on per-quantity [`EventBus`]es; each
//! [`VirtualSensor`] subscribes to the bus for its quantity and keeps the
//! last value reported for the physical endpoint it is bound to.
//!
//! All sensors implement the [`Sensor`] trait which provides version tracking
//! for change detection. Sensors that support live updates also implement
//! [`NotifiableSensor`] to wake the host as soon as a value changes.

pub mod bus;
pub mod notifier;
pub mod virtual_sensor;

pub use bus::{BusListener, Event, EventBus, EventBuses};
pub use notifier::ClusterNotifier;
pub use virtual_sensor::{SensorSnapshot, VirtualSensor};

/// Trait for sensors with change detection.
///
/// The version number is incremented each time the sensor value changes.
/// Hosts compare versions to decide whether a reading is new.
pub trait Sensor: Send + Sync {
    /// Get the current version number.
    fn version(&self) -> u32;
}

/// Trait for sensors that can push updates to the host instantly.
pub trait NotifiableSensor: Sensor {
    /// Set the notifier for this sensor.
    ///
    /// Called during host setup to wire the sensor to the
    /// subscription notification system.
    fn set_notifier(&self, notifier: ClusterNotifier);
}
