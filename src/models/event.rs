//! Event data structure.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::de;

/// Sort key used for events without a time of day.
pub const MIDNIGHT: &str = "00:00:00";

/// Data source an event was collected from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Platform {
    Cls,
    Jiuyangongshe,
    Tonghuashun,
    Investing,
    Eastmoney,
    /// A source introduced after this build; kept by its raw id.
    Other(String),
}

impl Platform {
    /// All platforms known at build time.
    pub const KNOWN: [Platform; 5] = [
        Platform::Cls,
        Platform::Jiuyangongshe,
        Platform::Tonghuashun,
        Platform::Investing,
        Platform::Eastmoney,
    ];

    /// Identifier used in resource keys.
    pub fn as_str(&self) -> &str {
        match self {
            Platform::Cls => "cls",
            Platform::Jiuyangongshe => "jiuyangongshe",
            Platform::Tonghuashun => "tonghuashun",
            Platform::Investing => "investing",
            Platform::Eastmoney => "eastmoney",
            Platform::Other(id) => id,
        }
    }

    /// Human-readable source name.
    pub fn display_name(&self) -> &str {
        match self {
            Platform::Cls => "财联社",
            Platform::Jiuyangongshe => "韭研公社",
            Platform::Tonghuashun => "同花顺",
            Platform::Investing => "英为财情",
            Platform::Eastmoney => "东方财富",
            Platform::Other(id) => id,
        }
    }

    /// True for the placeholder assigned when a payload omits the platform.
    pub fn is_unassigned(&self) -> bool {
        matches!(self, Platform::Other(id) if id.is_empty())
    }
}

impl Default for Platform {
    fn default() -> Self {
        Platform::Other(String::new())
    }
}

impl From<String> for Platform {
    fn from(id: String) -> Self {
        match id.trim() {
            "cls" => Platform::Cls,
            "jiuyangongshe" => Platform::Jiuyangongshe,
            "tonghuashun" => Platform::Tonghuashun,
            "investing" => Platform::Investing,
            "eastmoney" => Platform::Eastmoney,
            other => Platform::Other(other.to_string()),
        }
    }
}

impl From<&str> for Platform {
    fn from(id: &str) -> Self {
        Platform::from(id.to_string())
    }
}

impl From<Platform> for String {
    fn from(platform: Platform) -> Self {
        platform.as_str().to_string()
    }
}

impl FromStr for Platform {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Platform::from(s))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concept tag: either `{"name": ...}` or a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Concept {
    Named {
        #[serde(default, deserialize_with = "de::null_as_default")]
        name: String,
    },
    Bare(String),
}

impl Concept {
    pub fn name(&self) -> &str {
        match self {
            Concept::Named { name } => name,
            Concept::Bare(name) => name,
        }
    }
}

/// A calendar event from one platform partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique within platform + partition only
    #[serde(alias = "event_id", default)]
    pub id: String,

    /// Source platform (stamped by the loader when missing)
    #[serde(default)]
    pub platform: Platform,

    pub event_date: NaiveDate,

    #[serde(default, deserialize_with = "de::non_empty")]
    pub event_time: Option<String>,

    #[serde(default, deserialize_with = "de::non_empty", skip_serializing_if = "Option::is_none")]
    pub event_datetime: Option<String>,

    #[serde(default, deserialize_with = "de::null_as_default")]
    pub title: String,

    #[serde(default, deserialize_with = "de::non_empty")]
    pub content: Option<String>,

    #[serde(default, deserialize_with = "de::non_empty")]
    pub category: Option<String>,

    #[serde(default, deserialize_with = "de::non_empty")]
    pub country: Option<String>,

    #[serde(default, deserialize_with = "de::non_empty")]
    pub city: Option<String>,

    /// 1-5 when present
    #[serde(default, deserialize_with = "de::importance")]
    pub importance: Option<u8>,

    #[serde(default, deserialize_with = "de::truthy")]
    pub is_new: bool,

    #[serde(default, deserialize_with = "de::non_empty")]
    pub discovery_date: Option<String>,

    #[serde(default, deserialize_with = "de::null_as_default")]
    pub stocks: Vec<String>,

    #[serde(default, deserialize_with = "de::null_as_default")]
    pub themes: Vec<String>,

    #[serde(default, deserialize_with = "de::null_as_default")]
    pub concepts: Vec<Concept>,
}

impl Event {
    /// Importance with absence treated as 0.
    pub fn importance_rank(&self) -> u8 {
        self.importance.unwrap_or(0)
    }

    /// Time of day for ordering; absent sorts as midnight.
    pub fn time_key(&self) -> &str {
        self.event_time.as_deref().unwrap_or(MIDNIGHT)
    }

    /// Case-insensitive free-text match.
    ///
    /// `needle` must already be lowercase. Title, content, category and
    /// country are matched as substrings, as is every stock and theme.
    pub fn matches(&self, needle: &str) -> bool {
        let contains = |text: &str| text.to_lowercase().contains(needle);

        contains(&self.title)
            || [&self.content, &self.category, &self.country]
                .into_iter()
                .flatten()
                .any(|field| contains(field))
            || self.stocks.iter().any(|s| contains(s))
            || self.themes.iter().any(|t| contains(t))
    }

    /// Format event for display using a template.
    ///
    /// Supported placeholders:
    /// - `{date}`, `{time}`, `{platform}`, `{title}`
    /// - `{importance}`, `{category}`, `{country}`
    pub fn format(&self, template: &str) -> String {
        template
            .replace("{date}", &self.event_date.to_string())
            .replace("{time}", self.event_time.as_deref().unwrap_or("--:--"))
            .replace("{platform}", self.platform.display_name())
            .replace("{title}", &self.title)
            .replace("{importance}", &self.importance_rank().to_string())
            .replace("{category}", self.category.as_deref().unwrap_or(""))
            .replace("{country}", self.country.as_deref().unwrap_or(""))
    }
}
