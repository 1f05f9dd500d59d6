//! Atomic hardware capabilities.
//!
//! This module defines the fine-grained capability traits the acquisition
//! loop consumes. Instead of one monolithic sensor trait, devices implement
//! exactly the capability they provide:
//!
//! - An ADC input line implements `AnalogSource`
//! - A temperature/humidity sensor implements `ClimateSensor`
//!
//! Each capability trait:
//! - Is async (uses #[async_trait])
//! - Is thread-safe (requires Send + Sync)
//! - Focuses on ONE thing
//!
//! Hardware bring-up happens in an explicit factory step before the loop is
//! constructed; the loop only ever sees trait objects, so test doubles slot
//! in without touching real hardware.

use crate::acquisition::record::ClimateReading;
use crate::error::AppResult;
use async_trait::async_trait;

/// Capability: raw analog readout.
///
/// One instance corresponds to one wired ADC input line.
///
/// # Contract
/// - `read_raw()` returns the native 16-bit code in [0, 65535]; the caller
///   performs the 10-bit reduction that the logged data model uses
/// - Reads may be slow (bus I/O) but are not expected to fail during normal
///   operation; a failure is a wiring or bus fault, not a transient condition
#[async_trait]
pub trait AnalogSource: Send + Sync {
    /// Read the current conversion as a native 16-bit code.
    async fn read_raw(&self) -> AppResult<u16>;
}

/// Capability: atomic temperature/humidity readout.
///
/// # Contract
/// - `read()` returns both fields together or fails; partial readings are
///   not modeled
/// - Transient protocol faults (timeouts, checksum mismatches) surface as
///   `CollectorError::SensorRead` and are expected during normal operation;
///   the caller skips the sample and retries on the next cycle
#[async_trait]
pub trait ClimateSensor: Send + Sync {
    /// Read the current temperature/humidity pair.
    async fn read(&self) -> AppResult<ClimateReading>;
}
