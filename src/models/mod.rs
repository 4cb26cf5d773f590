// src/models/mod.rs

//! Domain models for the calendar query layer.
//!
//! Payload types mirror the JSON partitions published by the collection
//! pipeline; lenient field handling lives in `de`.

mod config;
pub(crate) mod de;
mod event;
mod partition;
mod report;
mod snapshot;

// Re-export all public types
pub use config::{CacheConfig, Config, LoggingConfig, QueryConfig, SourceConfig};
pub use event::{Concept, Event, MIDNIGHT, Platform};
pub use partition::{DataSources, IndexFile, PartitionIndex, Period};
pub use report::{
    ChangeReport, ChangeSummary, DateRange, Metadata, PlatformChanges, PlatformSummary,
    ReportedEvent,
};
pub use snapshot::PlatformSnapshot;

#[cfg(test)]
pub(crate) use event::fixtures;
