//! Structured logging bootstrap.
//!
//! This module wires up the `tracing` / `tracing-subscriber` stack for the
//! collector. The subscriber is installed explicitly from `main` after the
//! configuration has been loaded; library code only emits events and never
//! touches process-wide logging state.
//!
//! # Example
//! ```no_run
//! use aerovant::{config::CollectorConfig, telemetry};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CollectorConfig::default();
//! telemetry::init_from_config(&config)?;
//! tracing::info!("collector starting");
//! # Ok(())
//! # }
//! ```

use crate::config::CollectorConfig;
use tracing::Level;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, registry::Registry, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Output format for log lines.
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Pretty-printed format with colors (for development)
    Pretty,
    /// Compact format without colors (for long-running headless operation)
    Compact,
    /// JSON format for log aggregation
    Json,
}

/// Tracing configuration options.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: Level,
    /// Output format
    pub format: OutputFormat,
    /// Whether to enable ANSI colors (only for Pretty format)
    pub with_ansi: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: OutputFormat::Compact,
            with_ansi: false,
        }
    }
}

impl TracingConfig {
    /// Create tracing config with a custom level.
    pub fn new(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Set output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable or disable ANSI colors.
    pub fn with_ansi(mut self, enabled: bool) -> Self {
        self.with_ansi = enabled;
        self
    }
}

/// Initialize tracing from the collector configuration.
pub fn init_from_config(config: &CollectorConfig) -> Result<(), String> {
    let level = parse_log_level(&config.application.log_level)?;
    init(TracingConfig::new(level))
}

/// Initialize tracing with custom configuration.
///
/// Idempotent: if a global subscriber is already installed (as happens when
/// multiple tests initialize logging), this returns Ok(()) without error.
pub fn init(config: TracingConfig) -> Result<(), String> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string().to_lowercase()));

    match config.format {
        OutputFormat::Pretty => install(
            fmt::layer()
                .pretty()
                .with_ansi(config.with_ansi)
                .with_filter(env_filter),
        ),
        OutputFormat::Compact => install(
            fmt::layer()
                .compact()
                .with_ansi(false)
                .with_filter(env_filter),
        ),
        OutputFormat::Json => install(fmt::layer().json().with_filter(env_filter)),
    }
}

fn install<L>(layer: L) -> Result<(), String>
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    Registry::default().with(layer).try_init().or_else(|e| {
        // A second init attempt is expected in tests
        if e.to_string().contains("already been set") {
            Ok(())
        } else {
            Err(format!("Failed to initialize tracing: {e}"))
        }
    })
}

/// Parse a log level string into a tracing Level.
fn parse_log_level(level: &str) -> Result<Level, String> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(format!(
            "Invalid log level '{level}'. Must be one of: trace, debug, info, warn, error"
        )),
    }
}
