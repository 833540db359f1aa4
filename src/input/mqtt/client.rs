//! MQTT client wrapper for gateway report ingestion.

use crate::config::MqttConfig;
use log::{debug, error, info, warn};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use std::time::Duration;
use tokio::sync::mpsc;

/// Message received from MQTT broker.
#[derive(Debug, Clone)]
pub struct MqttMessage {
    pub topic: String,
    pub payload: String,
}

/// MQTT client for the gateway's report topic.
pub struct MqttClient {
    client: AsyncClient,
    event_loop: EventLoop,
}

impl MqttClient {
    /// Create a new MQTT client from configuration.
    pub fn new(config: &MqttConfig) -> Self {
        let mut options =
            MqttOptions::new(&config.client_id, &config.broker_host, config.broker_port);
        options.set_keep_alive(Duration::from_secs(30));

        // Set credentials if provided
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(options, 100);

        Self { client, event_loop }
    }

    /// Queue a subscription to `topic`.
    ///
    /// Does not wait on the event loop, so it is safe to call from inside it.
    pub fn subscribe(&self, topic: &str) -> Result<(), rumqttc::ClientError> {
        info!("Subscribing to MQTT topic: {}", topic);
        self.client.try_subscribe(topic, QoS::AtLeastOnce)
    }

    /// Run the MQTT event loop and forward messages to the provided channel.
    ///
    /// `subscription` is subscribed on every ConnAck: clean sessions lose their
    /// subscriptions when the broker connection drops. Connection errors are
    /// retried forever. Runs until the channel closes.
    pub async fn run(mut self, subscription: String, tx: mpsc::Sender<MqttMessage>) {
        info!("Starting MQTT event loop");

        loop {
            match self.event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    info!("MQTT connected");
                    if let Err(e) = self.subscribe(&subscription) {
                        warn!("Failed to subscribe to {}: {:?}", subscription, e);
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let topic = publish.topic.clone();
                    let payload = match String::from_utf8(publish.payload.to_vec()) {
                        Ok(s) => s,
                        Err(e) => {
                            warn!("Invalid UTF-8 in MQTT payload: {}", e);
                            continue;
                        }
                    };

                    debug!("Received MQTT message on {}: {}", topic, payload);

                    let msg = MqttMessage { topic, payload };
                    if tx.send(msg).await.is_err() {
                        error!("MQTT message channel closed");
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    error!("MQTT connection error: {:?}", e);
                    // Wait before reconnecting
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_subscribe_is_queued_without_a_connection() {
        let client = MqttClient::new(&Config::default().mqtt);
        client.subscribe("ptvo/reports").unwrap();
        // A reconnect subscribes again on the same client
        client.subscribe("ptvo/reports").unwrap();
        client.subscribe("ptvo/+/reports").unwrap();
    }

    #[tokio::test]
    async fn test_event_loop_keeps_retrying_refused_connections() {
        let mut config = Config::default().mqtt;
        config.broker_host = "127.0.0.1".to_string();
        config.broker_port = 1;

        let (tx, _rx) = mpsc::channel(1);
        let handle = tokio::spawn(MqttClient::new(&config).run("ptvo/reports".to_string(), tx));

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!handle.is_finished());
        handle.abort();
    }
}
