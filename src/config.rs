use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Load environment variables from .env file with robust parsing.
/// Handles values with spaces without requiring quotes.
pub fn load_dotenv() {
    let env_path = Path::new(".env");
    if !env_path.exists() {
        return;
    }

    let content = match fs::read_to_string(env_path) {
        Ok(c) => c,
        Err(_) => return,
    };

    for (key, value) in parse_dotenv(&content) {
        // Only set if not already set (env vars take precedence)
        if std::env::var(key).is_err() {
            // SAFETY: We're single-threaded at this point (called before any async runtime)
            unsafe { std::env::set_var(key, value) };
        }
    }
}

/// Split .env content into key/value pairs, skipping comments and blanks.
fn parse_dotenv(content: &str) -> Vec<(&str, &str)> {
    let mut pairs = Vec::new();

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Find the first '=' and split there
        if let Some(eq_pos) = line.find('=') {
            let key = line[..eq_pos].trim();
            let mut value = line[eq_pos + 1..].trim();

            // Remove surrounding quotes if present
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = &value[1..value.len() - 1];
            }

            pairs.push((key, value));
        }
    }

    pairs
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub mqtt: MqttConfig,
    pub device: DeviceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttConfig {
    pub broker_host: String,
    pub broker_port: u16,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Topic the gateway publishes decoded attribute reports on
    pub report_topic: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Built-in topology profile ("ptvo" or "ptvo-legacy")
    pub profile: String,
    /// JSON topology file; overrides `profile` when set
    pub topology_path: Option<PathBuf>,
    /// Name used in log output
    pub friendly_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mqtt: MqttConfig {
                broker_host: "10.0.0.2".to_string(),
                broker_port: 1883,
                client_id: "virtual-sensor-bridge".to_string(),
                username: None,
                password: None,
                report_topic: "ptvo/reports".to_string(),
            },
            device: DeviceConfig {
                profile: "ptvo".to_string(),
                topology_path: None,
                friendly_name: "PTVO Multi-Sensor".to_string(),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // MQTT configuration
        if let Ok(host) = std::env::var("MQTT_BROKER_HOST") {
            config.mqtt.broker_host = host;
        }
        if let Ok(port) = std::env::var("MQTT_BROKER_PORT")
            && let Ok(p) = port.parse()
        {
            config.mqtt.broker_port = p;
        }
        if let Ok(client_id) = std::env::var("MQTT_CLIENT_ID") {
            config.mqtt.client_id = client_id;
        }
        if let Ok(username) = std::env::var("MQTT_USERNAME") {
            config.mqtt.username = Some(username);
        }
        if let Ok(password) = std::env::var("MQTT_PASSWORD") {
            config.mqtt.password = Some(password);
        }
        if let Ok(topic) = std::env::var("MQTT_REPORT_TOPIC") {
            config.mqtt.report_topic = topic;
        }

        // Device configuration
        if let Ok(profile) = std::env::var("DEVICE_PROFILE") {
            config.device.profile = profile;
        }
        if let Ok(path) = std::env::var("DEVICE_TOPOLOGY") {
            config.device.topology_path = Some(PathBuf::from(path));
        }
        if let Ok(name) = std::env::var("DEVICE_FRIENDLY_NAME") {
            config.device.friendly_name = name;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.mqtt.broker_port, 1883);
        assert_eq!(config.device.profile, "ptvo");
        assert!(config.device.topology_path.is_none());
    }

    #[test]
    fn test_parse_dotenv() {
        let content = "# comment\n\nMQTT_BROKER_HOST=broker.local\nDEVICE_FRIENDLY_NAME = Garden Sensor\nMQTT_PASSWORD=\"se cret\"\nQUOTE='\nbroken line\n";
        let pairs = parse_dotenv(content);
        assert_eq!(
            pairs,
            vec![
                ("MQTT_BROKER_HOST", "broker.local"),
                ("DEVICE_FRIENDLY_NAME", "Garden Sensor"),
                ("MQTT_PASSWORD", "se cret"),
                ("QUOTE", "'"),
            ]
        );
    }
}
