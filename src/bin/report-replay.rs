//! Replay recorded attribute reports through a virtual device.
//!
//! Usage:
//!   cargo run --bin report-replay -- capture.jsonl
//!   cat capture.jsonl | cargo run --bin report-replay -- --profile ptvo-legacy
//!   cargo run --bin report-replay -- --topology my-device.json --json capture.jsonl
//!
//! Each input line is one JSON report object or an array of them. After the
//! replay the final virtual sensor values are printed.

use clap::Parser;
use log::{error, warn};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use virtual_sensor_bridge::device::{DeviceTopology, MultiSensorDevice};
use virtual_sensor_bridge::input::reports::decode_lines;
use virtual_sensor_bridge::{MemoryAttributeCache, Result};

#[derive(Parser)]
#[command(name = "report-replay")]
#[command(about = "Replay attribute reports through a PTVO virtual device")]
struct Cli {
    /// Built-in topology profile
    #[arg(long, env = "DEVICE_PROFILE", default_value = "ptvo")]
    profile: String,

    /// JSON topology file (overrides --profile)
    #[arg(long, env = "DEVICE_TOPOLOGY")]
    topology: Option<PathBuf>,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,

    /// Also print every cached attribute
    #[arg(long)]
    attributes: bool,

    /// Report file in JSON-lines format (stdin when omitted)
    input: Option<PathBuf>,
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut content = String::new();
            std::io::stdin().read_to_string(&mut content)?;
            Ok(content)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let topology = match &cli.topology {
        Some(path) => DeviceTopology::from_json_file(path)?,
        None => DeviceTopology::from_profile(&cli.profile)?,
    };

    let cache = Arc::new(MemoryAttributeCache::new());
    let mut device = MultiSensorDevice::new(topology, cache.clone())?;

    let content = read_input(cli.input.as_ref())?;
    let mut applied = 0usize;
    let mut events = 0usize;

    for (line, decoded) in decode_lines(&content) {
        let reports = match decoded {
            Ok(reports) => reports,
            Err(e) => {
                warn!("line {}: {}", line, e);
                continue;
            }
        };
        for report in &reports {
            match device.on_attribute_report(report) {
                Ok(event) => {
                    applied += 1;
                    events += usize::from(event.is_some());
                }
                Err(e) => warn!("line {}: {}", line, e),
            }
        }
    }

    let snapshot = device.snapshot();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        let topology = device.topology();
        println!("{} / {}", topology.manufacturer, topology.model);
        println!("{} report(s) applied, {} event(s) published", applied, events);
        for sensor in &snapshot {
            let value = sensor
                .value
                .map(|v| v.to_string())
                .unwrap_or_else(|| "no data".to_string());
            println!("  endpoint {:>3}  {:<12} {}", sensor.endpoint_id, sensor.kind, value);
        }
    }

    if cli.attributes {
        for (path, value) in cache.entries() {
            println!(
                "  endpoint {:>3}  {:<24} (0x{:04X}) 0x{:04X} = {:?}",
                path.endpoint_id,
                path.cluster,
                path.cluster.cluster_id(),
                path.attribute_id,
                value
            );
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run(Cli::parse()) {
        error!("{}", e);
        std::process::exit(1);
    }
}
