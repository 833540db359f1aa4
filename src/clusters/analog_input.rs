//! Per-endpoint router for the shared AnalogInput report stream.
//!
//! PTVO devices send a `PresentValue` report followed by a unit tag report on
//! the same endpoint. The router buffers the measurement and, when the tag
//! arrives, publishes the buffered value on the bus for the tagged quantity.
//! Endpoints with a fixed binding (e.g. a pulse counter) publish on every
//! measurement without waiting for a tag.

use super::units::{Classification, QuantityKind, classify};
use super::{AttributeValue, ClusterKind};
use crate::attribute_cache::{AttributeCache, AttributePath};
use crate::error::Result;
use crate::sensors::{Event, EventBuses};
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How an endpoint's measurements are assigned a quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointBinding {
    /// Quantity is decided by the unit tag following each measurement.
    #[default]
    UnitTag,
    /// Every measurement is published as this quantity immediately.
    Fixed(QuantityKind),
}

/// Router for one physical AnalogInput endpoint.
pub struct AnalogInputRouter {
    endpoint_id: u8,
    binding: EndpointBinding,
    /// Last scaled measurement; 0 until the first report.
    last_measurement: f64,
    cache: Arc<dyn AttributeCache>,
}

impl AnalogInputRouter {
    pub fn new(endpoint_id: u8, binding: EndpointBinding, cache: Arc<dyn AttributeCache>) -> Self {
        Self {
            endpoint_id,
            binding,
            last_measurement: 0.0,
            cache,
        }
    }

    pub fn last_measurement(&self) -> f64 {
        self.last_measurement
    }

    /// Handle one attribute report for this endpoint.
    ///
    /// Returns the event published, if any. Absent values leave everything
    /// untouched. Every other report is mirrored into the generic AnalogInput
    /// attribute before routing.
    pub fn handle_report(
        &mut self,
        attribute_id: u16,
        value: Option<&AttributeValue>,
        buses: &EventBuses,
    ) -> Result<Option<Event>> {
        let Some(value) = value else {
            debug!(
                "[AnalogInput] endpoint {} attribute 0x{:04X}: no data, skipped",
                self.endpoint_id, attribute_id
            );
            return Ok(None);
        };

        let classification = classify(attribute_id, value)?;

        self.cache.update_attribute(
            AttributePath::new(self.endpoint_id, ClusterKind::AnalogInput, attribute_id),
            value.clone(),
        );

        let event = match classification {
            Classification::MeasurementUpdate(measurement) => {
                self.last_measurement = measurement;
                match self.binding {
                    EndpointBinding::Fixed(kind) => {
                        Some(Event::new(kind, self.endpoint_id, measurement))
                    }
                    EndpointBinding::UnitTag => None,
                }
            }
            Classification::UnitTag(tag) => match QuantityKind::from_unit_tag(&tag) {
                Some(kind) if kind != QuantityKind::Counter => Some(Event::new(
                    kind,
                    self.endpoint_id,
                    self.last_measurement / kind.unit_divisor(),
                )),
                _ => {
                    debug!(
                        "[AnalogInput] endpoint {} unrecognised unit tag {:?}",
                        self.endpoint_id, tag
                    );
                    None
                }
            },
            Classification::Ignored => None,
        };

        if let Some(event) = &event {
            let delivered = buses.publish(event);
            debug!(
                "[AnalogInput] endpoint {} published {} = {} to {} subscriber(s)",
                self.endpoint_id, event.kind, event.value, delivered
            );
        }

        Ok(event)
    }
}
