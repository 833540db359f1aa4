//! PTVO multi-sensor device assembly.
//!
//! Owns the per-quantity event buses, one analog-input router per physical
//! endpoint and the virtual sensors that replace those endpoints on the host.
//! Everything is wired once at construction from a [`DeviceTopology`].

use super::topology::DeviceTopology;
use crate::attribute_cache::AttributeCache;
use crate::clusters::{AnalogInputRouter, AttributeReport, QuantityKind};
use crate::error::Result;
use crate::sensors::notifier::ChangeSignal;
use crate::sensors::{
    ClusterNotifier, Event, EventBuses, NotifiableSensor, SensorSnapshot, VirtualSensor,
};
use log::{debug, info};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A device whose analog-input endpoints are split into virtual sensors.
///
/// Reports are handled through `&mut self`, so one owner processes them
/// strictly in delivery order. Sensor values can be read concurrently
/// through the `Arc<VirtualSensor>` handles.
pub struct MultiSensorDevice {
    topology: DeviceTopology,
    buses: EventBuses,
    routers: BTreeMap<u8, AnalogInputRouter>,
    sensors: Vec<Arc<VirtualSensor>>,
}

impl MultiSensorDevice {
    /// Validate `topology` and wire routers, buses and virtual sensors.
    pub fn new(topology: DeviceTopology, cache: Arc<dyn AttributeCache>) -> Result<Self> {
        topology.validate()?;

        let mut buses = EventBuses::new();
        let mut routers = BTreeMap::new();
        let mut sensors = Vec::new();

        for endpoint in &topology.endpoints {
            routers.insert(
                endpoint.endpoint_id,
                AnalogInputRouter::new(endpoint.endpoint_id, endpoint.binding, cache.clone()),
            );
            for kind in &endpoint.virtual_sensors {
                sensors.push(VirtualSensor::attach(
                    *kind,
                    endpoint.endpoint_id,
                    cache.clone(),
                    &mut buses,
                ));
            }
        }

        info!(
            "Device {} / {} ready: {} endpoint(s), {} virtual sensor(s)",
            topology.manufacturer,
            topology.model,
            routers.len(),
            sensors.len()
        );

        Ok(Self {
            topology,
            buses,
            routers,
            sensors,
        })
    }

    pub fn topology(&self) -> &DeviceTopology {
        &self.topology
    }

    /// Process one report from the host transport.
    ///
    /// Returns the event the report produced, if any. Reports for endpoints
    /// outside the topology are dropped.
    pub fn on_attribute_report(&mut self, report: &AttributeReport) -> Result<Option<Event>> {
        let Some(router) = self.routers.get_mut(&report.endpoint_id) else {
            debug!(
                "Report for unknown endpoint {} (attribute 0x{:04X}) dropped",
                report.endpoint_id, report.attribute_id
            );
            return Ok(None);
        };
        router.handle_report(report.attribute_id, report.value.as_ref(), &self.buses)
    }

    /// Virtual sensor of `kind` bound to `endpoint_id`.
    pub fn sensor(&self, endpoint_id: u8, kind: QuantityKind) -> Option<Arc<VirtualSensor>> {
        self.sensors
            .iter()
            .find(|s| s.bound_endpoint_id() == endpoint_id && s.kind() == kind)
            .cloned()
    }

    pub fn sensors(&self) -> &[Arc<VirtualSensor>] {
        &self.sensors
    }

    pub fn snapshot(&self) -> Vec<SensorSnapshot> {
        self.sensors.iter().map(|s| s.snapshot()).collect()
    }

    /// Wire every virtual sensor to a shared change signal.
    pub fn set_notifiers(&self, signal: &'static ChangeSignal) {
        for sensor in &self.sensors {
            sensor.set_notifier(ClusterNotifier::new(
                signal,
                sensor.bound_endpoint_id(),
                sensor.kind().cluster(),
            ));
        }
    }
}
