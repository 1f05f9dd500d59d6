//! Custom error types for the application.
//!
//! This module defines the primary error type, `CollectorError`, for the entire
//! application. Using the `thiserror` crate, it provides a centralized and
//! consistent way to classify the faults the acquisition cycle has to absorb.
//!
//! ## Fault taxonomy
//!
//! The acquisition loop distinguishes a closed set of fault kinds, each with
//! its own declared recovery action:
//!
//! - **`SensorRead`**: a transient fault from the environmental sensor. The
//!   cycle is skipped with a warning and the loop retries after the normal
//!   interval.
//! - **`Storage` / `Io` / `Csv`**: a persistence fault while appending a
//!   record. The record is dropped with an error log and the loop continues.
//! - **Everything else** (`Channel`, `Hardware`, configuration variants) is
//!   unclassified from the loop's point of view: logged as an error and
//!   absorbed at the cycle boundary so the loop keeps its cadence.
//!
//! By using `#[from]`, `CollectorError` can be seamlessly created from
//! underlying error types, simplifying error handling throughout the
//! application with the `?` operator.

use thiserror::Error;

/// Convenience alias for results using the application error type.
pub type AppResult<T> = std::result::Result<T, CollectorError>;

/// Application error type covering configuration, hardware, and persistence.
#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("Configuration validation error: {0}")]
    Configuration(String),

    #[error("Environmental sensor read failed: {0}")]
    SensorRead(String),

    #[error("Channel '{0}' read failed: {1}")]
    Channel(String, String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV encoding error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Hardware error: {0}")]
    Hardware(String),

    #[error("Feature '{0}' is not enabled. Please build with --features {0}")]
    FeatureNotEnabled(String),
}

impl CollectorError {
    /// Whether this fault comes from the persistence layer.
    ///
    /// The loop drops the current record on these instead of skipping the
    /// cycle wholesale.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            CollectorError::Storage(_) | CollectorError::Io(_) | CollectorError::Csv(_)
        )
    }
}
