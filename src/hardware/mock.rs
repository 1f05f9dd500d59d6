//! Mock hardware implementations.
//!
//! Provides simulated sensors for running and testing the collector without
//! a Raspberry Pi attached. All mocks are async-safe and deterministic
//! unless jitter is requested.
//!
//! # Available mocks
//!
//! - `MockAnalogInput` - fixed, scripted, or jittered analog codes
//! - `MockClimateSensor` - fixed readings or a scripted mix of readings and
//!   transient failures

use crate::acquisition::record::ClimateReading;
use crate::error::{AppResult, CollectorError};
use crate::hardware::capabilities::{AnalogSource, ClimateSensor};
use async_trait::async_trait;
use rand::Rng;
use std::collections::VecDeque;
use tokio::sync::Mutex;

enum AnalogBehavior {
    Fixed(u16),
    /// Scripted codes are consumed front to back; the last one repeats.
    Sequence(VecDeque<u16>),
    Noisy {
        baseline: u16,
        jitter: u16,
    },
}

/// Simulated ADC input line.
pub struct MockAnalogInput {
    behavior: Mutex<AnalogBehavior>,
}

impl MockAnalogInput {
    /// Always returns the same native 16-bit code.
    pub fn fixed(raw16: u16) -> Self {
        Self {
            behavior: Mutex::new(AnalogBehavior::Fixed(raw16)),
        }
    }

    /// Returns the given codes in order, repeating the final one once the
    /// script is exhausted.
    pub fn sequence<I: IntoIterator<Item = u16>>(codes: I) -> Self {
        Self {
            behavior: Mutex::new(AnalogBehavior::Sequence(codes.into_iter().collect())),
        }
    }

    /// Returns `baseline` plus or minus a uniform random jitter, clamped to
    /// the 16-bit range.
    pub fn noisy(baseline: u16, jitter: u16) -> Self {
        Self {
            behavior: Mutex::new(AnalogBehavior::Noisy { baseline, jitter }),
        }
    }
}

#[async_trait]
impl AnalogSource for MockAnalogInput {
    async fn read_raw(&self) -> AppResult<u16> {
        let mut behavior = self.behavior.lock().await;
        let code = match &mut *behavior {
            AnalogBehavior::Fixed(code) => *code,
            AnalogBehavior::Sequence(codes) => {
                if codes.len() > 1 {
                    codes.pop_front().unwrap_or(0)
                } else {
                    codes.front().copied().unwrap_or(0)
                }
            }
            AnalogBehavior::Noisy { baseline, jitter } => {
                let jitter = i32::from(*jitter);
                let offset = rand::thread_rng().gen_range(-jitter..=jitter);
                (i32::from(*baseline) + offset).clamp(0, i32::from(u16::MAX)) as u16
            }
        };
        Ok(code)
    }
}

/// Simulated temperature/humidity sensor.
pub struct MockClimateSensor {
    script: Mutex<VecDeque<Result<ClimateReading, String>>>,
    fallback: Option<ClimateReading>,
}

impl MockClimateSensor {
    /// Always returns the same reading.
    pub fn fixed(temperature_c: f64, humidity_pct: f64) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(ClimateReading {
                temperature_c,
                humidity_pct,
            }),
        }
    }

    /// Plays back the given outcomes in order. Once the script is exhausted
    /// every further read fails, which keeps cycle counts deterministic in
    /// tests.
    pub fn scripted<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = Result<ClimateReading, String>>,
    {
        Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            fallback: None,
        }
    }

    /// Always fails with a transient fault.
    pub fn failing() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: None,
        }
    }
}

#[async_trait]
impl ClimateSensor for MockClimateSensor {
    async fn read(&self) -> AppResult<ClimateReading> {
        let mut script = self.script.lock().await;
        if let Some(outcome) = script.pop_front() {
            return outcome.map_err(CollectorError::SensorRead);
        }
        match self.fallback {
            Some(reading) => Ok(reading),
            None => Err(CollectorError::SensorRead(
                "simulated sensor offline".to_string(),
            )),
        }
    }
}
