//! Virtual measurement sensor backed by bus events.
//!
//! A virtual sensor exposes one quantity (temperature, humidity, pressure or
//! counter) for one physical endpoint. It starts without a value and holds
//! the last matching reading from then on; values are overwritten, never
//! cleared.
//!
//! Several sensors of the same kind share a bus (a device with two
//! thermometers has two temperature sensors), so each one only accepts
//! events from the endpoint it is bound to.

use super::bus::{BusListener, Event, EventBuses};
use super::{ClusterNotifier, NotifiableSensor, Sensor};
use crate::attribute_cache::{AttributeCache, AttributePath};
use crate::clusters::{AttributeValue, QuantityKind};
use chrono::{DateTime, Utc};
use log::{debug, info};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Default)]
struct Reading {
    value: Option<f64>,
    updated_at: Option<DateTime<Utc>>,
}

/// Point-in-time view of a virtual sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorSnapshot {
    pub endpoint_id: u8,
    pub kind: QuantityKind,
    pub value: Option<f64>,
    pub version: u32,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Thread-safe virtual sensor state.
///
/// Written by bus events on the device's report path and read by the host
/// from any thread.
pub struct VirtualSensor {
    kind: QuantityKind,
    bound_endpoint_id: u8,
    reading: RwLock<Reading>,
    version: AtomicU32,
    cache: Arc<dyn AttributeCache>,
    /// Set after host initialization via `set_notifier()`.
    notifier: RwLock<Option<ClusterNotifier>>,
}

impl VirtualSensor {
    /// Create a sensor that is not yet subscribed to any bus.
    pub fn new(kind: QuantityKind, bound_endpoint_id: u8, cache: Arc<dyn AttributeCache>) -> Self {
        Self {
            kind,
            bound_endpoint_id,
            reading: RwLock::new(Reading::default()),
            version: AtomicU32::new(0),
            cache,
            notifier: RwLock::new(None),
        }
    }

    /// Create a sensor and subscribe it to the bus for `kind`.
    pub fn attach(
        kind: QuantityKind,
        bound_endpoint_id: u8,
        cache: Arc<dyn AttributeCache>,
        buses: &mut EventBuses,
    ) -> Arc<Self> {
        let sensor = Arc::new(Self::new(kind, bound_endpoint_id, cache));
        buses.subscribe(kind, sensor.clone());
        sensor
    }

    pub fn kind(&self) -> QuantityKind {
        self.kind
    }

    pub fn bound_endpoint_id(&self) -> u8 {
        self.bound_endpoint_id
    }

    /// Last reported value, or `None` while no data has arrived.
    pub fn get(&self) -> Option<f64> {
        self.reading.read().value
    }

    /// Host attribute this sensor writes.
    pub fn attribute_path(&self) -> AttributePath {
        AttributePath::new(
            self.bound_endpoint_id,
            self.kind.cluster(),
            self.kind.value_attribute(),
        )
    }

    pub fn snapshot(&self) -> SensorSnapshot {
        let reading = self.reading.read();
        SensorSnapshot {
            endpoint_id: self.bound_endpoint_id,
            kind: self.kind,
            value: reading.value,
            version: self.version(),
            updated_at: reading.updated_at,
        }
    }

    /// Store a new value and push it to the host.
    ///
    /// The attribute cache is written on every update; the version only
    /// moves (and the notifier only fires) when the value actually changed.
    fn set(&self, value: f64) {
        let old = {
            let mut reading = self.reading.write();
            reading.updated_at = Some(Utc::now());
            reading.value.replace(value)
        };

        self.cache
            .update_attribute(self.attribute_path(), AttributeValue::Number(value));

        if old != Some(value) {
            self.version.fetch_add(1, Ordering::SeqCst);
            info!(
                "[Sensor] endpoint {} {} updated: {}",
                self.bound_endpoint_id, self.kind, value
            );
            if let Some(notifier) = self.notifier.read().as_ref() {
                notifier.notify();
            }
        }
    }
}

impl BusListener for VirtualSensor {
    fn on_event(&self, event: &Event) {
        if event.kind != self.kind || event.source_endpoint_id != self.bound_endpoint_id {
            debug!(
                "[Sensor] endpoint {} {} ignoring event from endpoint {}",
                self.bound_endpoint_id, self.kind, event.source_endpoint_id
            );
            return;
        }
        self.set(event.value);
    }
}

impl NotifiableSensor for VirtualSensor {
    fn set_notifier(&self, notifier: ClusterNotifier) {
        *self.notifier.write() = Some(notifier);
    }
}

impl Sensor for VirtualSensor {
    fn version(&self) -> u32 {
        self.version.load(Ordering::SeqCst)
    }
}
