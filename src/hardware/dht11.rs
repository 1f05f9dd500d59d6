//! DHT11 temperature/humidity sensor over GPIO.
//!
//! The DHT11 speaks a single-wire protocol: the host holds the line low for
//! 18 ms, then the sensor answers with a 40-bit frame where each bit is a
//! 50 us low followed by a high pulse whose width encodes the value. The
//! whole exchange is timing-critical, so the read runs as a blocking task
//! off the async runtime.
//!
//! Timeouts and checksum mismatches are routine with this part and surface
//! as `CollectorError::SensorRead`, which the acquisition loop treats as a
//! skip-and-retry condition.

use crate::acquisition::record::ClimateReading;
use crate::error::{AppResult, CollectorError};
use crate::hardware::capabilities::ClimateSensor;
use async_trait::async_trait;
use rppal::gpio::{Gpio, IoPin, Level, Mode};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Upper bound for any single protocol phase.
const PHASE_TIMEOUT: Duration = Duration::from_micros(300);

/// High pulses longer than this decode as a 1 bit (nominal: 26-28 us for a
/// 0, ~70 us for a 1).
const ONE_BIT_THRESHOLD: Duration = Duration::from_micros(48);

/// DHT11 sensor on one BCM GPIO pin.
pub struct Dht11 {
    pin: Arc<Mutex<IoPin>>,
}

impl Dht11 {
    /// Claim the given BCM GPIO pin for the sensor's data line.
    pub fn open(bcm_pin: u8) -> AppResult<Self> {
        let gpio =
            Gpio::new().map_err(|e| CollectorError::Hardware(format!("GPIO init failed: {e}")))?;
        let pin = gpio
            .get(bcm_pin)
            .map_err(|e| CollectorError::Hardware(format!("GPIO pin {bcm_pin}: {e}")))?
            .into_io(Mode::Input);
        Ok(Self {
            pin: Arc::new(Mutex::new(pin)),
        })
    }
}

#[async_trait]
impl ClimateSensor for Dht11 {
    async fn read(&self) -> AppResult<ClimateReading> {
        let pin = Arc::clone(&self.pin);
        tokio::task::spawn_blocking(move || {
            let mut pin = pin
                .lock()
                .map_err(|_| CollectorError::Hardware("DHT11 pin lock poisoned".to_string()))?;
            read_frame(&mut pin)
        })
        .await
        .map_err(|e| CollectorError::Hardware(format!("DHT11 read task failed: {e}")))?
    }
}

fn read_frame(pin: &mut IoPin) -> AppResult<ClimateReading> {
    // Host start signal: hold low >= 18 ms, release, then listen.
    pin.set_mode(Mode::Output);
    pin.set_low();
    std::thread::sleep(Duration::from_millis(18));
    pin.set_high();
    spin_for(Duration::from_micros(30));
    pin.set_mode(Mode::Input);

    // Sensor response preamble: ~80 us low, ~80 us high, then the first
    // bit's 50 us low period begins.
    wait_for_level(pin, Level::Low)?;
    wait_for_level(pin, Level::High)?;
    wait_for_level(pin, Level::Low)?;

    let mut bytes = [0u8; 5];
    for bit in 0..40 {
        wait_for_level(pin, Level::High)?;
        let width = level_duration(pin, Level::High)?;
        if width > ONE_BIT_THRESHOLD {
            bytes[bit / 8] |= 1 << (7 - bit % 8);
        }
    }

    let sum = bytes[0]
        .wrapping_add(bytes[1])
        .wrapping_add(bytes[2])
        .wrapping_add(bytes[3]);
    if sum != bytes[4] {
        return Err(CollectorError::SensorRead(format!(
            "checksum mismatch (expected {:#04x}, got {:#04x})",
            bytes[4], sum
        )));
    }

    Ok(ClimateReading {
        humidity_pct: f64::from(bytes[0]) + f64::from(bytes[1]) / 10.0,
        temperature_c: f64::from(bytes[2]) + f64::from(bytes[3]) / 10.0,
    })
}

/// Block until the line reaches `level`.
fn wait_for_level(pin: &IoPin, level: Level) -> AppResult<()> {
    let start = Instant::now();
    while pin.read() != level {
        if start.elapsed() > PHASE_TIMEOUT {
            return Err(CollectorError::SensorRead(format!(
                "timeout waiting for line {level:?}"
            )));
        }
    }
    Ok(())
}

/// Block while the line stays at `level`, returning how long it held.
fn level_duration(pin: &IoPin, level: Level) -> AppResult<Duration> {
    let start = Instant::now();
    while pin.read() == level {
        if start.elapsed() > PHASE_TIMEOUT {
            return Err(CollectorError::SensorRead(format!(
                "line stuck {level:?} mid-frame"
            )));
        }
    }
    Ok(start.elapsed())
}

fn spin_for(duration: Duration) {
    let start = Instant::now();
    while start.elapsed() < duration {
        std::hint::spin_loop();
    }
}
