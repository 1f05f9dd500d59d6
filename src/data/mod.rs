//! Data persistence for acquisition records.

pub mod sink;

pub use sink::{CsvSink, RecordSink};
