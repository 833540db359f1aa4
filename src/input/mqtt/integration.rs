//! MQTT Integration orchestrator for report ingestion.
//!
//! Connects to the broker, subscribes to the gateway's report topic and feeds
//! every decoded report into one [`MultiSensorDevice`]. The device is moved
//! into a single task, so reports are applied one at a time in arrival order.

use super::client::{MqttClient, MqttMessage};
use crate::config::MqttConfig;
use crate::device::MultiSensorDevice;
use crate::input::reports::decode_payload;
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Decode `payload` and apply every report in it to `device`.
///
/// Returns the number of events published. Bad payloads and rejected
/// reports are logged and skipped.
pub fn apply_payload(device: &mut MultiSensorDevice, name: &str, payload: &str) -> usize {
    let reports = match decode_payload(payload) {
        Ok(reports) => reports,
        Err(e) => {
            warn!("[MQTT] {} ignoring undecodable payload: {}", name, e);
            return 0;
        }
    };

    let mut published = 0;
    for report in &reports {
        match device.on_attribute_report(report) {
            Ok(Some(event)) => {
                debug!(
                    "[MQTT] {} endpoint {} -> {} {}",
                    name, event.source_endpoint_id, event.kind, event.value
                );
                published += 1;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(
                    "[MQTT] {} rejected report for endpoint {}: {}",
                    name, report.endpoint_id, e
                );
            }
        }
    }
    published
}

/// Apply messages from `rx` to `device` until the channel closes.
///
/// `topic` is the subscription filter and may contain `+` or `#` wildcards.
///
/// Returns the device so callers can inspect it after shutdown.
pub async fn pump_messages(
    mut device: MultiSensorDevice,
    name: String,
    topic: String,
    mut rx: mpsc::Receiver<MqttMessage>,
) -> MultiSensorDevice {
    while let Some(msg) = rx.recv().await {
        if !rumqttc::matches(&msg.topic, &topic) {
            debug!("[MQTT] Ignoring message on {}", msg.topic);
            continue;
        }
        apply_payload(&mut device, &name, &msg.payload);
    }
    device
}

/// MQTT Integration orchestrator.
///
/// Manages the MQTT client and the report subscription, keeping MQTT
/// internals out of main.rs.
pub struct MqttIntegration {
    config: MqttConfig,
    friendly_name: String,
    device: MultiSensorDevice,
}

impl MqttIntegration {
    /// Create a new MQTT integration feeding `device`.
    pub fn new(
        config: MqttConfig,
        friendly_name: impl Into<String>,
        device: MultiSensorDevice,
    ) -> Self {
        Self {
            config,
            friendly_name: friendly_name.into(),
            device,
        }
    }

    /// Start the MQTT integration.
    ///
    /// Spawns a background task that connects to the broker, subscribes to
    /// the report topic and applies reports to the device. Returns a
    /// JoinHandle that can be used to abort the task on shutdown.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(self) {
        info!(
            "[MQTT] Connecting to {}:{}",
            self.config.broker_host, self.config.broker_port
        );

        let mqtt_client = MqttClient::new(&self.config);
        let (msg_tx, msg_rx) = mpsc::channel::<MqttMessage>(64);

        info!(
            "[MQTT] {} listening on {}",
            self.friendly_name, self.config.report_topic
        );

        // Both halves run in this task, so aborting it stops the event loop too
        tokio::join!(
            mqtt_client.run(self.config.report_topic.clone(), msg_tx),
            pump_messages(
                self.device,
                self.friendly_name,
                self.config.report_topic,
                msg_rx,
            )
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute_cache::MemoryAttributeCache;
    use crate::clusters::QuantityKind;
    use crate::config::Config;
    use crate::device::DeviceTopology;
    use std::sync::Arc;

    fn device() -> MultiSensorDevice {
        MultiSensorDevice::new(DeviceTopology::ptvo(), Arc::new(MemoryAttributeCache::new()))
            .unwrap()
    }

    fn message(topic: &str, payload: &str) -> MqttMessage {
        MqttMessage {
            topic: topic.to_string(),
            payload: payload.to_string(),
        }
    }

    #[test]
    fn test_apply_payload_counts_events() {
        let mut device = device();
        let published = apply_payload(
            &mut device,
            "test",
            r#"[{"endpoint_id":1,"attribute_id":85,"value":21.5},
                {"endpoint_id":1,"attribute_id":28,"value":"C"},
                {"endpoint_id":4,"attribute_id":85,"value":3}]"#,
        );
        assert_eq!(published, 2);
        assert_eq!(
            device.sensor(1, QuantityKind::Temperature).unwrap().get(),
            Some(2150.0)
        );
    }

    #[test]
    fn test_bad_reports_are_skipped() {
        let mut device = device();
        assert_eq!(apply_payload(&mut device, "test", "{"), 0);

        let published = apply_payload(
            &mut device,
            "test",
            r#"[{"endpoint_id":4,"attribute_id":85,"value":"x"},
                {"endpoint_id":4,"attribute_id":85,"value":2}]"#,
        );
        assert_eq!(published, 1);
        assert_eq!(device.sensor(4, QuantityKind::Counter).unwrap().get(), Some(200.0));
    }

    #[tokio::test]
    async fn test_pump_applies_messages_in_order() {
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(pump_messages(
            device(),
            "test".to_string(),
            "ptvo/reports".to_string(),
            rx,
        ));

        for (topic, payload) in [
            ("ptvo/reports", r#"{"endpoint_id":3,"attribute_id":85,"value":1013.0}"#),
            ("other/topic", r#"{"endpoint_id":3,"attribute_id":85,"value":1.0}"#),
            ("ptvo/reports", r#"{"endpoint_id":3,"attribute_id":28,"value":"Pa"}"#),
        ] {
            tx.send(message(topic, payload)).await.unwrap();
        }
        drop(tx);

        let device = handle.await.unwrap();
        assert_eq!(
            device.sensor(3, QuantityKind::Pressure).unwrap().get(),
            Some(10.13)
        );
    }

    #[tokio::test]
    async fn test_pump_accepts_wildcard_subscriptions() {
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(pump_messages(
            device(),
            "test".to_string(),
            "ptvo/+/reports".to_string(),
            rx,
        ));

        for (topic, payload) in [
            ("ptvo/dev1/reports", r#"{"endpoint_id":4,"attribute_id":85,"value":3}"#),
            ("ptvo/dev1/state", r#"{"endpoint_id":4,"attribute_id":85,"value":9}"#),
        ] {
            tx.send(message(topic, payload)).await.unwrap();
        }
        drop(tx);

        let device = handle.await.unwrap();
        assert_eq!(device.sensor(4, QuantityKind::Counter).unwrap().get(), Some(300.0));
    }

    #[tokio::test]
    async fn test_integration_survives_unreachable_broker() {
        let mut config = Config::default().mqtt;
        config.broker_host = "127.0.0.1".to_string();
        config.broker_port = 1;

        let handle = MqttIntegration::new(config, "test", device()).start();
        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        assert!(!handle.is_finished());
        handle.abort();
    }

    #[test]
    fn test_pump_with_closed_channel_returns_device() {
        let (tx, rx) = mpsc::channel::<MqttMessage>(1);
        drop(tx);
        let device = tokio_test::block_on(pump_messages(
            device(),
            "test".to_string(),
            "ptvo/reports".to_string(),
            rx,
        ));
        assert!(device.snapshot().iter().all(|s| s.value.is_none()));
    }
}
