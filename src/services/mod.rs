//! Service layer for the calendar query layer.
//!
//! - Partition index (`IndexService`)
//! - Partition fetching with failure policy (`PartitionLoader`)
//! - Current-versus-archive routing (`RecencyClassifier`)
//! - Point, range and text queries (`QueryEngine`)
//! - Derived views over loaded snapshots (`aggregate`)

pub mod aggregate;
mod index;
mod loader;
pub mod order;
mod query;
mod recency;

pub use aggregate::{LatestEvents, PlatformStats};
pub use index::IndexService;
pub use loader::PartitionLoader;
pub use query::QueryEngine;
pub use recency::{MonthBucket, Recency, RecencyClassifier};
