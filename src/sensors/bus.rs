//! Per-quantity event buses.
//!
//! Buses are owned by the device and live as long as it does. Delivery is
//! synchronous and in subscription order; nothing is buffered, so late
//! subscribers never see earlier events.

use crate::clusters::QuantityKind;
use log::trace;
use std::sync::Arc;

/// A classified reading published by a router.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub kind: QuantityKind,
    pub source_endpoint_id: u8,
    pub value: f64,
}

impl Event {
    pub fn new(kind: QuantityKind, source_endpoint_id: u8, value: f64) -> Self {
        Self {
            kind,
            source_endpoint_id,
            value,
        }
    }
}

/// Receiver of bus events.
pub trait BusListener: Send + Sync {
    fn on_event(&self, event: &Event);
}

/// Publish/subscribe channel for a single quantity kind.
pub struct EventBus {
    kind: QuantityKind,
    listeners: Vec<Arc<dyn BusListener>>,
}

impl EventBus {
    pub fn new(kind: QuantityKind) -> Self {
        Self {
            kind,
            listeners: Vec::new(),
        }
    }

    pub fn kind(&self) -> QuantityKind {
        self.kind
    }

    pub fn subscribe(&mut self, listener: Arc<dyn BusListener>) {
        self.listeners.push(listener);
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver `event` to every subscriber. Returns the number of deliveries.
    pub fn publish(&self, event: &Event) -> usize {
        debug_assert_eq!(event.kind, self.kind);
        if self.listeners.is_empty() {
            trace!("No {} subscribers for endpoint {}", self.kind, event.source_endpoint_id);
        }
        for listener in &self.listeners {
            listener.on_event(event);
        }
        self.listeners.len()
    }
}

/// One bus per [`QuantityKind`], as owned by a device.
pub struct EventBuses {
    temperature: EventBus,
    humidity: EventBus,
    pressure: EventBus,
    counter: EventBus,
}

impl Default for EventBuses {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBuses {
    pub fn new() -> Self {
        Self {
            temperature: EventBus::new(QuantityKind::Temperature),
            humidity: EventBus::new(QuantityKind::Humidity),
            pressure: EventBus::new(QuantityKind::Pressure),
            counter: EventBus::new(QuantityKind::Counter),
        }
    }

    pub fn bus(&self, kind: QuantityKind) -> &EventBus {
        match kind {
            QuantityKind::Temperature => &self.temperature,
            QuantityKind::Humidity => &self.humidity,
            QuantityKind::Pressure => &self.pressure,
            QuantityKind::Counter => &self.counter,
        }
    }

    fn bus_mut(&mut self, kind: QuantityKind) -> &mut EventBus {
        match kind {
            QuantityKind::Temperature => &mut self.temperature,
            QuantityKind::Humidity => &mut self.humidity,
            QuantityKind::Pressure => &mut self.pressure,
            QuantityKind::Counter => &mut self.counter,
        }
    }

    pub fn subscribe(&mut self, kind: QuantityKind, listener: Arc<dyn BusListener>) {
        self.bus_mut(kind).subscribe(listener);
    }

    /// Publish on the bus matching `event.kind`.
    pub fn publish(&self, event: &Event) -> usize {
        self.bus(event.kind).publish(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<(&'static str, Event)>>>,
    }

    impl BusListener for Recorder {
        fn on_event(&self, event: &Event) {
            self.log.lock().push((self.name, *event));
        }
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let buses = EventBuses::new();
        let delivered = buses.publish(&Event::new(QuantityKind::Pressure, 3, 10.13));
        assert_eq!(delivered, 0);
    }

    #[test]
    fn test_delivery_in_subscription_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut buses = EventBuses::new();
        for name in ["first", "second", "third"] {
            buses.subscribe(
                QuantityKind::Temperature,
                Arc::new(Recorder {
                    name,
                    log: log.clone(),
                }),
            );
        }

        let event = Event::new(QuantityKind::Temperature, 1, 2150.0);
        assert_eq!(buses.publish(&event), 3);

        let names: Vec<_> = log.lock().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
        assert!(log.lock().iter().all(|(_, e)| *e == event));
    }

    #[test]
    fn test_buses_are_separate_per_kind() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut buses = EventBuses::new();
        buses.subscribe(
            QuantityKind::Humidity,
            Arc::new(Recorder {
                name: "humidity",
                log: log.clone(),
            }),
        );

        buses.publish(&Event::new(QuantityKind::Temperature, 1, 2150.0));
        assert!(log.lock().is_empty());
        assert_eq!(buses.bus(QuantityKind::Humidity).subscriber_count(), 1);
        assert_eq!(buses.bus(QuantityKind::Temperature).subscriber_count(), 0);
    }
}
