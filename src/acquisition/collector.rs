//! The acquisition loop: read, build, append, sleep.
//!
//! One `Collector` owns the configured channel set, the environmental
//! sensor, and the record sink, and cycles them at a fixed cadence until a
//! stop is requested. No fault originating inside a cycle ever escapes the
//! loop: each kind is matched explicitly and absorbed with a log line, and
//! every cycle ends in the same sleep so the sampling interval is constant
//! regardless of success or failure.

use crate::acquisition::record::{ChannelSample, RecordBuilder};
use crate::data::sink::RecordSink;
use crate::error::{AppResult, CollectorError};
use crate::hardware::capabilities::{AnalogSource, ClimateSensor};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// One named gas-sensor channel: an identifier (doubling as the output
/// column name) and the analog source wired to it.
pub struct NamedChannel {
    /// Column name, e.g. "MQ135_adc".
    pub id: String,
    /// The ADC input line behind this channel.
    pub source: Box<dyn AnalogSource>,
}

/// Counters describing a collector run.
///
/// Every cycle lands in exactly one of `records_written`, `climate_skips`,
/// `storage_failures`, or `faults`.
#[derive(Debug, Clone, Default)]
pub struct CollectorStatus {
    /// Cycles completed (successful or not).
    pub cycles: u64,
    /// Records successfully appended to the sink.
    pub records_written: u64,
    /// Cycles skipped because the environmental read failed.
    pub climate_skips: u64,
    /// Records dropped because the sink append failed.
    pub storage_failures: u64,
    /// Cycles absorbed as unclassified faults.
    pub faults: u64,
    /// Most recent fault message, if any.
    pub last_error: Option<String>,
}

/// Periodic sampler that appends one record per successful cycle.
pub struct Collector {
    channels: Vec<NamedChannel>,
    climate: Box<dyn ClimateSensor>,
    sink: Box<dyn RecordSink>,
    builder: RecordBuilder,
    interval: Duration,
    status: CollectorStatus,
}

impl Collector {
    /// Assemble a collector from already-initialized capabilities.
    ///
    /// Channel order is preserved for the lifetime of the run and must match
    /// the sink's column order.
    pub fn new(
        channels: Vec<NamedChannel>,
        climate: Box<dyn ClimateSensor>,
        sink: Box<dyn RecordSink>,
        builder: RecordBuilder,
        interval: Duration,
    ) -> Self {
        Self {
            channels,
            climate,
            sink,
            builder,
            interval,
            status: CollectorStatus::default(),
        }
    }

    /// Counters for the run so far.
    pub fn status(&self) -> &CollectorStatus {
        &self.status
    }

    /// Run cycles until `shutdown` signals a stop.
    ///
    /// The stop request is honored at the cycle boundary: a cycle in
    /// progress completes, and the request interrupts the sleep that
    /// follows. Dropping the sender also stops the loop.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.interval.as_secs_f64(),
            channels = self.channels.len(),
            true_ppm = self.builder.true_ppm(),
            "starting acquisition loop"
        );

        loop {
            match self.cycle().await {
                Ok(()) => {
                    self.status.records_written += 1;
                }
                Err(CollectorError::SensorRead(reason)) => {
                    self.status.climate_skips += 1;
                    self.status.last_error = Some(reason.clone());
                    warn!(%reason, "environmental sensor reading failed, skipping sample");
                }
                Err(err) if err.is_persistence() => {
                    self.status.storage_failures += 1;
                    self.status.last_error = Some(err.to_string());
                    error!(error = %err, "failed to append record, sample dropped");
                }
                Err(err) => {
                    self.status.faults += 1;
                    self.status.last_error = Some(err.to_string());
                    error!(error = %err, "unclassified fault in acquisition cycle");
                }
            }
            self.status.cycles += 1;

            tokio::select! {
                () = sleep(self.interval) => {}
                _ = shutdown.changed() => {
                    info!("stop requested, leaving acquisition loop");
                    break;
                }
            }
        }

        info!(
            cycles = self.status.cycles,
            records = self.status.records_written,
            "acquisition loop stopped"
        );
    }

    /// One READ -> BUILD -> APPEND pass.
    async fn cycle(&mut self) -> AppResult<()> {
        let mut samples = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            let raw16 = channel
                .source
                .read_raw()
                .await
                .map_err(|e| CollectorError::Channel(channel.id.clone(), e.to_string()))?;
            samples.push(ChannelSample::from_raw16(&channel.id, raw16));
        }

        let climate = self.climate.read().await?;

        let record = self.builder.build(samples, climate);
        debug!(
            temp_c = climate.temperature_c,
            hum_pct = climate.humidity_pct,
            channels = record.channels.len(),
            "assembled acquisition record"
        );

        self.sink.append(&record).await?;
        info!(
            temp_c = climate.temperature_c,
            hum_pct = climate.humidity_pct,
            "logged new data point"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::record::{AcquisitionRecord, ClimateReading};
    use crate::hardware::mock::{MockAnalogInput, MockClimateSensor};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Sink double that records appends and can be scripted to fail.
    struct ScriptedSink {
        appended: Arc<Mutex<Vec<AcquisitionRecord>>>,
        fail_next: Arc<Mutex<u32>>,
    }

    impl ScriptedSink {
        fn new() -> (Self, Arc<Mutex<Vec<AcquisitionRecord>>>, Arc<Mutex<u32>>) {
            let appended = Arc::new(Mutex::new(Vec::new()));
            let fail_next = Arc::new(Mutex::new(0));
            (
                Self {
                    appended: Arc::clone(&appended),
                    fail_next: Arc::clone(&fail_next),
                },
                appended,
                fail_next,
            )
        }
    }

    #[async_trait]
    impl RecordSink for ScriptedSink {
        async fn append(&mut self, record: &AcquisitionRecord) -> AppResult<()> {
            let mut fail_next = self.fail_next.lock().unwrap();
            if *fail_next > 0 {
                *fail_next -= 1;
                return Err(CollectorError::Storage("disk full".to_string()));
            }
            self.appended.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    fn one_channel(codes: &[u16]) -> Vec<NamedChannel> {
        vec![NamedChannel {
            id: "MQ135_adc".to_string(),
            source: Box::new(MockAnalogInput::sequence(codes.iter().copied())),
        }]
    }

    #[tokio::test(start_paused = true)]
    async fn cadence_is_constant_across_mixed_cycles() {
        let (sink, appended, _) = ScriptedSink::new();
        let climate = MockClimateSensor::scripted([
            Err("no response".to_string()),
            Ok(ClimateReading {
                temperature_c: 24.0,
                humidity_pct: 55.0,
            }),
            Err("checksum mismatch".to_string()),
            Ok(ClimateReading {
                temperature_c: 24.5,
                humidity_pct: 54.0,
            }),
        ]);
        let mut collector = Collector::new(
            one_channel(&[1000]),
            Box::new(climate),
            Box::new(sink),
            RecordBuilder::new(100),
            Duration::from_secs(1),
        );

        let (stop_tx, stop_rx) = watch::channel(false);
        let start = tokio::time::Instant::now();
        let handle = tokio::spawn(async move {
            collector.run(stop_rx).await;
            collector
        });

        // Cycles run at t = 0s, 1s, 2s, 3s regardless of the success/skip
        // mix; by t = 3.5s exactly four cycles have completed.
        tokio::time::sleep(Duration::from_millis(3500)).await;
        stop_tx.send(true).unwrap();
        let collector = handle.await.unwrap();

        assert_eq!(collector.status().cycles, 4);
        assert_eq!(collector.status().records_written, 2);
        assert_eq!(collector.status().climate_skips, 2);
        assert_eq!(appended.lock().unwrap().len(), 2);
        assert!(start.elapsed() >= Duration::from_millis(3500));
    }

    #[tokio::test(start_paused = true)]
    async fn sensor_failure_skips_exactly_one_cycle() {
        let (sink, appended, _) = ScriptedSink::new();
        let climate = MockClimateSensor::scripted([
            Err("no response".to_string()),
            Ok(ClimateReading {
                temperature_c: 22.0,
                humidity_pct: 50.0,
            }),
        ]);
        let mut collector = Collector::new(
            one_channel(&[65535, 0]),
            Box::new(climate),
            Box::new(sink),
            RecordBuilder::new(100),
            Duration::from_secs(1),
        );

        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            collector.run(stop_rx).await;
            collector
        });

        // After the first cycle (t = 0) nothing has been appended.
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(appended.lock().unwrap().len(), 0);

        // One interval later the next cycle has run and logged a record.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(appended.lock().unwrap().len(), 1);

        stop_tx.send(true).unwrap();
        let collector = handle.await.unwrap();
        assert_eq!(collector.status().climate_skips, 1);
        assert_eq!(collector.status().records_written, 1);

        // The skipped cycle produced no record; the logged one carries the
        // second scripted ADC code.
        let records = appended.lock().unwrap();
        assert_eq!(records[0].channels[0].raw_code, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn storage_failure_drops_record_and_continues() {
        let (sink, appended, fail_next) = ScriptedSink::new();
        *fail_next.lock().unwrap() = 1;
        let mut collector = Collector::new(
            one_channel(&[512]),
            Box::new(MockClimateSensor::fixed(24.0, 55.0)),
            Box::new(sink),
            RecordBuilder::new(100),
            Duration::from_secs(1),
        );

        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            collector.run(stop_rx).await;
            collector
        });

        tokio::time::sleep(Duration::from_millis(1500)).await;
        stop_tx.send(true).unwrap();
        let collector = handle.await.unwrap();

        assert_eq!(collector.status().cycles, 2);
        assert_eq!(collector.status().storage_failures, 1);
        assert_eq!(collector.status().records_written, 1);
        assert_eq!(appended.lock().unwrap().len(), 1);
        assert!(collector
            .status()
            .last_error
            .as_deref()
            .is_some_and(|e| e.contains("disk full")));
    }

    #[tokio::test(start_paused = true)]
    async fn channels_are_read_in_configured_order() {
        let (sink, appended, _) = ScriptedSink::new();
        let channels = vec![
            NamedChannel {
                id: "MQ2_adc".to_string(),
                source: Box::new(MockAnalogInput::fixed(64)),
            },
            NamedChannel {
                id: "MQ4_adc".to_string(),
                source: Box::new(MockAnalogInput::fixed(128)),
            },
            NamedChannel {
                id: "MQ135_adc".to_string(),
                source: Box::new(MockAnalogInput::fixed(192)),
            },
        ];
        let mut collector = Collector::new(
            channels,
            Box::new(MockClimateSensor::fixed(24.0, 55.0)),
            Box::new(sink),
            RecordBuilder::new(100),
            Duration::from_secs(1),
        );

        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            collector.run(stop_rx).await;
        });

        tokio::time::sleep(Duration::from_millis(500)).await;
        stop_tx.send(true).unwrap();
        handle.await.unwrap();

        let records = appended.lock().unwrap();
        let names: Vec<&str> = records[0]
            .channels
            .iter()
            .map(|s| s.channel.as_str())
            .collect();
        assert_eq!(names, vec!["MQ2_adc", "MQ4_adc", "MQ135_adc"]);
        let codes: Vec<u16> = records[0].channels.iter().map(|s| s.raw_code).collect();
        assert_eq!(codes, vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_sender_stops_the_loop() {
        let (sink, _, _) = ScriptedSink::new();
        let mut collector = Collector::new(
            one_channel(&[512]),
            Box::new(MockClimateSensor::fixed(24.0, 55.0)),
            Box::new(sink),
            RecordBuilder::new(100),
            Duration::from_secs(1),
        );

        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            collector.run(stop_rx).await;
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(stop_tx);
        handle.await.unwrap();
    }
}
