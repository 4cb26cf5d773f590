//! Platform snapshot payloads.

use serde::{Deserialize, Serialize};

use super::de;
use super::{Event, Platform};

/// All events of one platform for one scope (current, or one archive month).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformSnapshot {
    #[serde(default)]
    pub platform: Platform,

    /// Records that fail to parse are skipped with a warning
    #[serde(default, deserialize_with = "de::skip_malformed")]
    pub events: Vec<Event>,

    /// Advisory count written by the producer; not guaranteed to match `events`
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub total_events: u64,

    #[serde(
        default,
        alias = "last_update",
        deserialize_with = "de::non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated: Option<String>,
}

impl PlatformSnapshot {
    /// Empty snapshot, used when an archive does not exist.
    pub fn empty(platform: Platform) -> Self {
        Self {
            platform,
            ..Self::default()
        }
    }

    /// Attribute this snapshot and its events to `platform`.
    ///
    /// Events that carry their own platform id keep it.
    pub fn assign(mut self, platform: &Platform) -> Self {
        self.platform = platform.clone();
        for event in &mut self.events {
            if event.platform.is_unassigned() {
                event.platform = platform.clone();
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
