//! Append-only record sinks.
//!
//! The collector persists one row per successful cycle. A sink owns the
//! column layout for the lifetime of one output file: the header is decided
//! once at construction and every row is emitted in the same fixed order.

use crate::acquisition::record::AcquisitionRecord;
use crate::error::{AppResult, CollectorError};
use async_trait::async_trait;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// Trait for an append-only acquisition record sink.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Append one record as a row, emitting the header first if this sink
    /// was created over a fresh file.
    async fn append(&mut self, record: &AcquisitionRecord) -> AppResult<()>;
}

/// CSV sink writing one row per record.
///
/// Each append is an independent open-write-close: no file handle is held
/// between cycles, so a run of arbitrary length never leaks a descriptor at
/// the cost of re-opening the file once per sample.
pub struct CsvSink {
    path: PathBuf,
    columns: Vec<String>,
    header_written: bool,
}

impl CsvSink {
    /// Fixed leading columns preceding the per-channel columns.
    const BASE_COLUMNS: [&'static str; 4] = ["timestamp", "true_ppm", "temp_c", "hum_pct"];

    /// Create a sink for `path` with one trailing column per channel id.
    ///
    /// Whether the header still needs to be written is determined here, from
    /// the file's existence, and never re-derived mid-run. Appending to a
    /// file left over from an earlier run therefore never duplicates the
    /// header (and never verifies the old one matches, either).
    pub fn create(path: impl AsRef<Path>, channel_ids: &[String]) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut columns: Vec<String> = Self::BASE_COLUMNS.iter().map(ToString::to_string).collect();
        columns.extend(channel_ids.iter().cloned());
        let header_written = path.exists();
        Ok(Self {
            path,
            columns,
            header_written,
        })
    }

    /// The column layout this sink writes, header order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    fn row(&self, record: &AcquisitionRecord) -> AppResult<Vec<String>> {
        if record.channels.len() + Self::BASE_COLUMNS.len() != self.columns.len() {
            return Err(CollectorError::Storage(format!(
                "record has {} channels but the header has {}",
                record.channels.len(),
                self.columns.len() - Self::BASE_COLUMNS.len()
            )));
        }

        let mut row = Vec::with_capacity(self.columns.len());
        row.push(record.timestamp.to_rfc3339());
        row.push(record.true_ppm.to_string());
        match record.climate {
            Some(climate) => {
                row.push(format_float(climate.temperature_c));
                row.push(format_float(climate.humidity_pct));
            }
            None => {
                row.push(String::new());
                row.push(String::new());
            }
        }
        for sample in &record.channels {
            row.push(sample.raw_code.to_string());
        }
        Ok(row)
    }
}

#[async_trait]
impl RecordSink for CsvSink {
    async fn append(&mut self, record: &AcquisitionRecord) -> AppResult<()> {
        let row = self.row(record)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if !self.header_written {
            writer.write_record(&self.columns)?;
        }
        writer.write_record(&row)?;
        writer.flush()?;

        self.header_written = true;
        Ok(())
    }
}

/// Render a float the way the log format expects: whole values keep one
/// decimal place (24.0, not 24).
fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::record::{ChannelSample, ClimateReading, RecordBuilder};
    use tempfile::TempDir;

    fn channel_ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(ToString::to_string).collect()
    }

    fn sample_record(ppm: u32, codes: &[(&str, u16)]) -> AcquisitionRecord {
        let builder = RecordBuilder::new(ppm);
        builder.build(
            codes
                .iter()
                .map(|(id, raw16)| ChannelSample::from_raw16(*id, *raw16))
                .collect(),
            ClimateReading {
                temperature_c: 24.0,
                humidity_pct: 55.0,
            },
        )
    }

    fn read_lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(ToString::to_string)
            .collect()
    }

    #[tokio::test]
    async fn header_is_written_exactly_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.csv");
        let ids = channel_ids(&["MQ2_adc", "MQ135_adc"]);

        let mut sink = CsvSink::create(&path, &ids).unwrap();
        for _ in 0..3 {
            sink.append(&sample_record(100, &[("MQ2_adc", 0), ("MQ135_adc", 65535)]))
                .await
                .unwrap();
        }

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "timestamp,true_ppm,temp_c,hum_pct,MQ2_adc,MQ135_adc");
        let headers = lines.iter().filter(|l| l.starts_with("timestamp")).count();
        assert_eq!(headers, 1);
    }

    #[tokio::test]
    async fn restart_on_existing_file_does_not_duplicate_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.csv");
        let ids = channel_ids(&["MQ135_adc"]);

        {
            let mut sink = CsvSink::create(&path, &ids).unwrap();
            sink.append(&sample_record(100, &[("MQ135_adc", 64)]))
                .await
                .unwrap();
        }

        // Second process lifetime over the same path.
        let mut sink = CsvSink::create(&path, &ids).unwrap();
        sink.append(&sample_record(100, &[("MQ135_adc", 128)]))
            .await
            .unwrap();

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("timestamp"));
        assert!(!lines[1].starts_with("timestamp"));
        assert!(!lines[2].starts_with("timestamp"));
    }

    #[tokio::test]
    async fn every_row_matches_header_arity() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.csv");
        let ids = channel_ids(&["MQ2_adc", "MQ4_adc", "MQ5_adc"]);

        let mut sink = CsvSink::create(&path, &ids).unwrap();
        for i in 0..10u16 {
            sink.append(&sample_record(
                100,
                &[("MQ2_adc", i), ("MQ4_adc", i * 2), ("MQ5_adc", i * 3)],
            ))
            .await
            .unwrap();
        }

        let lines = read_lines(&path);
        let header_fields = lines[0].split(',').count();
        assert_eq!(header_fields, 7);
        for line in &lines {
            assert_eq!(line.split(',').count(), header_fields);
        }
    }

    #[tokio::test]
    async fn channel_count_mismatch_is_a_storage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.csv");
        let ids = channel_ids(&["MQ2_adc", "MQ135_adc"]);

        let mut sink = CsvSink::create(&path, &ids).unwrap();
        let result = sink.append(&sample_record(100, &[("MQ2_adc", 5)])).await;
        assert!(matches!(result, Err(CollectorError::Storage(_))));
        assert!(!path.exists(), "rejected record must not touch the file");
    }

    #[tokio::test]
    async fn whole_floats_keep_a_decimal_point() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.csv");
        let ids = channel_ids(&["MQ135_adc"]);

        let mut sink = CsvSink::create(&path, &ids).unwrap();
        sink.append(&sample_record(100, &[("MQ135_adc", 0)]))
            .await
            .unwrap();

        let lines = read_lines(&path);
        let fields: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(fields[1], "100");
        assert_eq!(fields[2], "24.0");
        assert_eq!(fields[3], "55.0");
        assert_eq!(fields[4], "0");
    }

    #[tokio::test]
    async fn absent_climate_renders_empty_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.csv");
        let ids = channel_ids(&["MQ135_adc"]);

        let mut record = sample_record(100, &[("MQ135_adc", 65535)]);
        record.climate = None;

        let mut sink = CsvSink::create(&path, &ids).unwrap();
        sink.append(&record).await.unwrap();

        let lines = read_lines(&path);
        assert_eq!(
            lines[1].split(',').skip(2).take(2).collect::<Vec<_>>(),
            vec!["", ""]
        );
        assert!(lines[1].ends_with(",1023"));
    }
}
