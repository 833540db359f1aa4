use embassy_sync::signal::Signal;
use log::{error, info};
use std::sync::Arc;
use tokio::signal;
use virtual_sensor_bridge::config::{Config, DeviceConfig, load_dotenv};
use virtual_sensor_bridge::device::{DeviceTopology, MultiSensorDevice};
use virtual_sensor_bridge::input::mqtt::MqttIntegration;
use virtual_sensor_bridge::sensors::notifier::ChangeSignal;
use virtual_sensor_bridge::sensors::{Sensor, VirtualSensor};
use virtual_sensor_bridge::{MemoryAttributeCache, Result};

/// Raised by any virtual sensor whose value changed.
static SENSOR_CHANGED: ChangeSignal = Signal::new();

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn load_topology(config: &DeviceConfig) -> Result<DeviceTopology> {
    match &config.topology_path {
        Some(path) => {
            info!("Loading topology from {}", path.display());
            DeviceTopology::from_json_file(path)
        }
        None => DeviceTopology::from_profile(&config.profile),
    }
}

/// Log every sensor whose version moved since the last wakeup.
async fn watch_sensors(sensors: Vec<Arc<VirtualSensor>>) {
    let mut seen: Vec<u32> = sensors.iter().map(|s| s.version()).collect();
    loop {
        SENSOR_CHANGED.wait().await;
        for (sensor, last) in sensors.iter().zip(seen.iter_mut()) {
            let version = sensor.version();
            if version != *last {
                *last = version;
                info!(
                    "Endpoint {} {} -> {:?}",
                    sensor.bound_endpoint_id(),
                    sensor.kind(),
                    sensor.get()
                );
            }
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file before anything else
    load_dotenv();
    init_logger();
    info!("Starting Virtual Sensor Bridge");

    let config = Config::from_env();
    info!("Configuration loaded:");
    info!("  Device: {}", config.device.friendly_name);
    info!("  Profile: {}", config.device.profile);
    info!(
        "  MQTT: {}:{} ({})",
        config.mqtt.broker_host, config.mqtt.broker_port, config.mqtt.report_topic
    );

    let topology = match load_topology(&config.device) {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to load device topology: {}", e);
            std::process::exit(1);
        }
    };

    let cache = Arc::new(MemoryAttributeCache::new());
    let device = match MultiSensorDevice::new(topology, cache.clone()) {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to assemble device: {}", e);
            std::process::exit(1);
        }
    };

    device.set_notifiers(&SENSOR_CHANGED);
    let watcher = tokio::spawn(watch_sensors(device.sensors().to_vec()));

    let mqtt_handle =
        MqttIntegration::new(config.mqtt, config.device.friendly_name, device).start();

    info!("Virtual Sensor Bridge is running");
    info!("  - Press Ctrl+C to exit");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal");
        }
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
        }
    }

    mqtt_handle.abort();
    watcher.abort();

    info!("{} attribute(s) cached at shutdown", cache.len());
    info!("Virtual Sensor Bridge stopped");
}
