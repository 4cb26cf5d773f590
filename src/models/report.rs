//! Dataset metadata and daily change reports.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Platform;
use super::de;

/// Inclusive date span as written by the collector (either end may be absent).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, deserialize_with = "de::non_empty")]
    pub start: Option<String>,
    #[serde(default, deserialize_with = "de::non_empty")]
    pub end: Option<String>,
}

/// Per-platform entry of `metadata.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSummary {
    #[serde(default, deserialize_with = "de::non_empty")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub event_count: u64,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub date_range: DateRange,
}

/// Dataset-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, alias = "collection_time", deserialize_with = "de::non_empty")]
    pub last_updated: Option<String>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub total_events: u64,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub platforms: BTreeMap<Platform, PlatformSummary>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub date_range: DateRange,
    #[serde(default, deserialize_with = "de::non_empty")]
    pub collection_type: Option<String>,
}

/// Change counters of one detection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub total_new: u64,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub total_updated: u64,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub total_cancelled: u64,
}

impl ChangeSummary {
    pub fn has_changes(&self) -> bool {
        self.total_new + self.total_updated + self.total_cancelled > 0
    }
}

/// Per-platform change counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformChanges {
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub new_events: u64,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub updated_events: u64,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub cancelled_events: u64,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub sample_new_titles: Vec<String>,
}

/// Condensed event listed in a change report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedEvent {
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub platform: Platform,
    #[serde(default, alias = "event_date", deserialize_with = "de::non_empty")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "de::importance")]
    pub importance: Option<u8>,
    #[serde(default, deserialize_with = "de::non_empty")]
    pub country: Option<String>,
}

/// Daily change report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeReport {
    #[serde(default, deserialize_with = "de::non_empty")]
    pub detection_time: Option<String>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub summary: ChangeSummary,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub platforms: BTreeMap<Platform, PlatformChanges>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub top_new_events: Vec<ReportedEvent>,
}
