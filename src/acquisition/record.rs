//! Acquisition record model and raw-code conversion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reduce a native 16-bit ADC code to the logged 10-bit range.
///
/// The MCP3008 produces 10-bit conversions that the bus layer reports
/// left-justified in a 16-bit word; dropping the low 6 bits recovers the
/// conversion. The mapping truncates (it does not round) and is monotonic
/// non-decreasing: 0 maps to 0 and 65535 maps to 1023.
pub const fn raw16_to_raw10(raw16: u16) -> u16 {
    raw16 >> 6
}

/// One gas-sensor sample: a named channel and its 10-bit raw code.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChannelSample {
    /// Channel identifier, doubling as the output column name.
    pub channel: String,
    /// Raw ADC code in [0, 1023].
    pub raw_code: u16,
}

impl ChannelSample {
    /// Build a sample from a native 16-bit code, applying the 10-bit
    /// reduction.
    pub fn from_raw16(channel: impl Into<String>, raw16: u16) -> Self {
        Self {
            channel: channel.into(),
            raw_code: raw16_to_raw10(raw16),
        }
    }
}

/// An atomic temperature/humidity reading from the environmental sensor.
///
/// The two fields always travel together; a failed read yields no
/// `ClimateReading` at all rather than a partial one.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClimateReading {
    /// Temperature in degrees Celsius.
    pub temperature_c: f64,
    /// Relative humidity in percent.
    pub humidity_pct: f64,
}

/// A timestamped acquisition record, one per successful cycle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AcquisitionRecord {
    /// Wall-clock capture time.
    pub timestamp: DateTime<Utc>,
    /// Operator-supplied known gas concentration for the experiment.
    pub true_ppm: u32,
    /// Environmental reading; `None` renders as empty columns.
    pub climate: Option<ClimateReading>,
    /// Channel samples in fixed column order.
    pub channels: Vec<ChannelSample>,
}

/// Assembles acquisition records, stamping the run-constant ppm value and
/// the current wall-clock time.
#[derive(Clone, Debug)]
pub struct RecordBuilder {
    true_ppm: u32,
}

impl RecordBuilder {
    /// Create a builder for a run with the given known gas concentration.
    pub fn new(true_ppm: u32) -> Self {
        Self { true_ppm }
    }

    /// The run-constant ppm value.
    pub fn true_ppm(&self) -> u32 {
        self.true_ppm
    }

    /// Assemble a record from one cycle's samples.
    pub fn build(
        &self,
        channels: Vec<ChannelSample>,
        climate: ClimateReading,
    ) -> AcquisitionRecord {
        AcquisitionRecord {
            timestamp: Utc::now(),
            true_ppm: self.true_ppm,
            climate: Some(climate),
            channels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_endpoints() {
        assert_eq!(raw16_to_raw10(0), 0);
        assert_eq!(raw16_to_raw10(65535), 1023);
        assert_eq!(raw16_to_raw10(64), 1);
        assert_eq!(raw16_to_raw10(63), 0); // truncates, does not round
    }

    #[test]
    fn conversion_is_monotonic_and_in_range() {
        let mut last = 0u16;
        for raw16 in (0..=u16::MAX).step_by(97) {
            let raw10 = raw16_to_raw10(raw16);
            assert!(raw10 <= 1023);
            assert!(raw10 >= last);
            last = raw10;
        }
        assert_eq!(raw16_to_raw10(u16::MAX), 1023);
    }

    #[test]
    fn builder_stamps_constant_ppm() {
        let builder = RecordBuilder::new(250);
        let record = builder.build(
            vec![ChannelSample::from_raw16("MQ135_adc", 65535)],
            ClimateReading {
                temperature_c: 24.0,
                humidity_pct: 55.0,
            },
        );
        assert_eq!(record.true_ppm, 250);
        assert_eq!(record.channels.len(), 1);
        assert_eq!(record.channels[0].raw_code, 1023);
        assert!(record.climate.is_some());
    }

    #[test]
    fn from_raw16_applies_reduction() {
        let sample = ChannelSample::from_raw16("MQ2_adc", 32768);
        assert_eq!(sample.raw_code, 512);
        assert_eq!(sample.channel, "MQ2_adc");
    }
}
