//! CLI entry point for the AEROVANT data collector.
//!
//! Wires configuration, logging, hardware bring-up, and the acquisition
//! loop together, then runs until Ctrl+C. Hardware is built in an explicit
//! factory step and handed to the loop as capability trait objects, so the
//! same binary drives either the Raspberry Pi bus (`--features
//! hardware_rpi`) or simulated sensors (`--mock`).
//!
//! # Usage
//!
//! Log five MQ channels every 10 seconds:
//! ```bash
//! aerovant --output custom_sensor_data.csv --interval 10
//! ```
//!
//! Dry-run without hardware:
//! ```bash
//! aerovant --mock --interval 1
//! ```

use aerovant::acquisition::{Collector, NamedChannel, RecordBuilder};
use aerovant::config::CollectorConfig;
use aerovant::data::CsvSink;
use aerovant::error::AppResult;
use aerovant::hardware::ClimateSensor;
use aerovant::telemetry;
use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

#[derive(Parser)]
#[command(name = "aerovant")]
#[command(about = "Real-time gas-sensor data collection", long_about = None)]
struct Cli {
    /// Output file path for data logging
    #[arg(long)]
    output: Option<PathBuf>,

    /// Time interval between samples in seconds
    #[arg(long)]
    interval: Option<u64>,

    /// Configuration file
    #[arg(long, default_value = "config/aerovant.toml")]
    config: PathBuf,

    /// Run against simulated sensors instead of the Raspberry Pi bus
    #[arg(long)]
    mock: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = CollectorConfig::load_from(&cli.config)?;
    if let Some(output) = cli.output {
        config.acquisition.output = output;
    }
    if let Some(seconds) = cli.interval {
        config.acquisition.sample_interval = Duration::from_secs(seconds);
    }
    config.validate().map_err(|e| anyhow!(e))?;

    telemetry::init_from_config(&config).map_err(|e| anyhow!(e))?;
    info!(
        output = %config.acquisition.output.display(),
        interval_secs = config.acquisition.sample_interval.as_secs_f64(),
        true_ppm = config.acquisition.true_ppm,
        mock = cli.mock,
        "AEROVANT data collection starting"
    );

    let (channels, climate) = build_hardware(&config, cli.mock)?;
    let sink = CsvSink::create(&config.acquisition.output, &config.channel_ids())?;
    let builder = RecordBuilder::new(config.acquisition.true_ppm);
    let mut collector = Collector::new(
        channels,
        climate,
        Box::new(sink),
        builder,
        config.acquisition.sample_interval,
    );

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = stop_tx.send(true);
        }
    });

    collector.run(stop_rx).await;

    let status = collector.status();
    info!(
        cycles = status.cycles,
        records = status.records_written,
        skipped = status.climate_skips,
        "collector shut down"
    );
    Ok(())
}

/// Explicit hardware bring-up, separated from collector construction so the
/// loop itself never touches a bus.
fn build_hardware(
    config: &CollectorConfig,
    mock: bool,
) -> AppResult<(Vec<NamedChannel>, Box<dyn ClimateSensor>)> {
    if mock {
        return Ok(build_mock_hardware(config));
    }
    build_rpi_hardware(config)
}

fn build_mock_hardware(config: &CollectorConfig) -> (Vec<NamedChannel>, Box<dyn ClimateSensor>) {
    use aerovant::hardware::mock::{MockAnalogInput, MockClimateSensor};

    let channels = config
        .channels
        .iter()
        .map(|channel| NamedChannel {
            id: channel.id.clone(),
            // Mid-scale baseline with visible jitter
            source: Box::new(MockAnalogInput::noisy(32768, 2048)),
        })
        .collect();
    let climate: Box<dyn ClimateSensor> = Box::new(MockClimateSensor::fixed(24.0, 55.0));
    (channels, climate)
}

#[cfg(feature = "hardware_rpi")]
fn build_rpi_hardware(
    config: &CollectorConfig,
) -> AppResult<(Vec<NamedChannel>, Box<dyn ClimateSensor>)> {
    use aerovant::hardware::dht11::Dht11;
    use aerovant::hardware::mcp3008::{Mcp3008, Mcp3008Input};
    use std::sync::Arc;

    let adc = Mcp3008::open()?;
    let mut channels = Vec::with_capacity(config.channels.len());
    for channel in &config.channels {
        channels.push(NamedChannel {
            id: channel.id.clone(),
            source: Box::new(Mcp3008Input::new(Arc::clone(&adc), channel.adc_input)?),
        });
    }
    let climate: Box<dyn ClimateSensor> = Box::new(Dht11::open(config.hardware.dht_gpio)?);
    Ok((channels, climate))
}

#[cfg(not(feature = "hardware_rpi"))]
fn build_rpi_hardware(
    _config: &CollectorConfig,
) -> AppResult<(Vec<NamedChannel>, Box<dyn ClimateSensor>)> {
    Err(aerovant::error::CollectorError::FeatureNotEnabled(
        "hardware_rpi".to_string(),
    ))
}
