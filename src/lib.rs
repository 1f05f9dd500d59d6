//! # AEROVANT Acquisition Library
//!
//! This crate is the core library for the `aerovant` data collector: a
//! long-running daemon that samples a set of MQ gas sensors through an
//! MCP3008 ADC alongside a DHT11 temperature/humidity sensor, and appends
//! each sample as a timestamped row to a CSV log for gas-sensor calibration
//! experiments.
//!
//! ## Crate Structure
//!
//! - **`acquisition`**: the record model (`AcquisitionRecord`,
//!   `RecordBuilder`) and the `Collector` loop that cycles read -> build ->
//!   append at a fixed cadence.
//! - **`calibrate`**: wiring constants for the R_S/R_0 calibration method.
//!   Post-processing only; the sampling path logs raw codes.
//! - **`config`**: strongly-typed configuration loaded from TOML and
//!   environment variables via `figment`. See `config::CollectorConfig`.
//! - **`data`**: the `RecordSink` trait and the append-only `CsvSink` with
//!   its once-only header.
//! - **`error`**: the `CollectorError` enum classifying the closed set of
//!   faults the loop absorbs.
//! - **`hardware`**: capability traits (`AnalogSource`, `ClimateSensor`),
//!   mock devices for tests and `--mock` runs, and the Raspberry Pi drivers
//!   behind the `hardware_rpi` feature.
//! - **`telemetry`**: `tracing` subscriber bootstrap, installed explicitly
//!   from the binary.

pub mod acquisition;
pub mod calibrate;
pub mod config;
pub mod data;
pub mod error;
pub mod hardware;
pub mod telemetry;
