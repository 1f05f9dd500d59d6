//! Acquisition cycle: record model, builder, and the sampling loop.

pub mod collector;
pub mod record;

pub use collector::{Collector, CollectorStatus, NamedChannel};
pub use record::{AcquisitionRecord, ChannelSample, ClimateReading, RecordBuilder};
