//! Hardware capability traits, mock devices, and Raspberry Pi drivers.
//!
//! The real drivers (MCP3008 over SPI, DHT11 over GPIO) are only built with
//! the `hardware_rpi` feature; everything else in the crate depends solely
//! on the capability traits.

pub mod capabilities;
pub mod mock;

#[cfg(feature = "hardware_rpi")]
pub mod dht11;
#[cfg(feature = "hardware_rpi")]
pub mod mcp3008;

pub use capabilities::{AnalogSource, ClimateSensor};
