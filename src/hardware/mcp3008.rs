//! MCP3008 analog-to-digital converter over SPI.
//!
//! The MCP3008 is an 8-input, 10-bit SAR ADC. Each configured gas-sensor
//! channel maps to one input line; all lines share the one SPI device, so
//! the handles hand out access through a shared bus lock.

use crate::error::{AppResult, CollectorError};
use crate::hardware::capabilities::AnalogSource;
use async_trait::async_trait;
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Maximum reliable clock for the MCP3008 at a 3.3 V supply.
const SPI_CLOCK_HZ: u32 = 1_350_000;

/// Shared handle to the MCP3008 chip.
pub struct Mcp3008 {
    spi: Mutex<Spi>,
}

impl Mcp3008 {
    /// Open the ADC on the primary SPI bus, hardware chip-select 0.
    pub fn open() -> AppResult<Arc<Self>> {
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, SPI_CLOCK_HZ, Mode::Mode0)
            .map_err(|e| CollectorError::Hardware(format!("failed to open SPI bus: {e}")))?;
        Ok(Arc::new(Self {
            spi: Mutex::new(spi),
        }))
    }

}

/// One single-ended MCP3008 input line.
pub struct Mcp3008Input {
    adc: Arc<Mcp3008>,
    line: u8,
}

impl Mcp3008Input {
    /// Create an `AnalogSource` handle for one input line (0-7) of a shared
    /// chip.
    pub fn new(adc: Arc<Mcp3008>, line: u8) -> AppResult<Self> {
        if line > 7 {
            return Err(CollectorError::Configuration(format!(
                "MCP3008 input {line} out of range (0-7)"
            )));
        }
        Ok(Self { adc, line })
    }
}

#[async_trait]
impl AnalogSource for Mcp3008Input {
    async fn read_raw(&self) -> AppResult<u16> {
        let spi = self.adc.spi.lock().await;

        // Start bit, single-ended mode, input line in the next three bits.
        let write = [0x01, 0x80 | (self.line << 4), 0x00];
        let mut read = [0u8; 3];
        spi.transfer(&mut read, &write).map_err(|e| {
            CollectorError::Channel(format!("adc{}", self.line), format!("SPI transfer: {e}"))
        })?;

        let raw10 = (u16::from(read[1] & 0x03) << 8) | u16::from(read[2]);
        // Left-justified, so the logged 10-bit reduction recovers the
        // conversion exactly.
        Ok(raw10 << 6)
    }
}
