//! Partition index and archive periods.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::Platform;
use super::de;
use crate::error::AppError;

/// A calendar month identifying one historical partition.
///
/// Ordering is lexicographic by (year, month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    pub fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month)
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.next()?.first_day()?.pred_opt()
    }

    /// The following month.
    pub fn next(&self) -> Option<Period> {
        let next = self.first_day()?.checked_add_months(Months::new(1))?;
        Some(Self::of(next))
    }

    /// Every month from `start` through `end` inclusive.
    pub fn span(start: Period, end: Period) -> Vec<Period> {
        let mut periods = Vec::new();
        let mut cursor = Some(start);
        while let Some(period) = cursor.filter(|p| *p <= end) {
            periods.push(period);
            cursor = period.next();
        }
        periods
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = AppError;

    /// Parse `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| AppError::validation("Invalid period format. Use YYYY-MM (e.g., 2025-01)"))?;
        let year: i32 = year
            .parse()
            .map_err(|_| AppError::validation(format!("Invalid year in period '{s}'")))?;
        let month: u32 = month
            .parse()
            .map_err(|_| AppError::validation(format!("Invalid month in period '{s}'")))?;

        let period = Period::new(year, month);
        if !period.is_valid() {
            return Err(AppError::validation(format!("Month out of range in period '{s}'")));
        }
        Ok(period)
    }
}

/// Wire shape of `index.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexFile {
    #[serde(default, deserialize_with = "de::null_as_default")]
    platforms: Vec<Platform>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    data_sources: DataSources,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataSources {
    #[serde(default, deserialize_with = "de::null_as_default")]
    historical: HashMap<Platform, Option<Vec<Period>>>,
}

/// Known platforms and, per platform, the archived months.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "IndexFile")]
pub struct PartitionIndex {
    platforms: Vec<Platform>,
    historical: BTreeMap<Platform, Vec<Period>>,
}

impl From<IndexFile> for PartitionIndex {
    fn from(file: IndexFile) -> Self {
        let mut platforms = Vec::new();
        for platform in file.platforms {
            if !platforms.contains(&platform) {
                platforms.push(platform);
            }
        }

        let historical = file
            .data_sources
            .historical
            .into_iter()
            .map(|(platform, periods)| {
                let periods: BTreeSet<Period> = periods
                    .unwrap_or_default()
                    .into_iter()
                    .filter(Period::is_valid)
                    .collect();
                (platform, periods.into_iter().collect())
            })
            .collect();

        Self {
            platforms,
            historical,
        }
    }
}

impl PartitionIndex {
    pub fn new(platforms: Vec<Platform>, historical: BTreeMap<Platform, Vec<Period>>) -> Self {
        Self::from(IndexFile {
            platforms,
            data_sources: DataSources {
                historical: historical
                    .into_iter()
                    .map(|(platform, periods)| (platform, Some(periods)))
                    .collect(),
            },
        })
    }

    /// Platforms with a current snapshot, in index order.
    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    /// Archived months for a platform, ascending. Empty means no archives yet.
    pub fn periods(&self, platform: &Platform) -> &[Period] {
        self.historical
            .get(platform)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Platforms with at least one archive: listed platforms first, then
    /// archive-only platforms in id order.
    pub fn archived_platforms(&self) -> Vec<&Platform> {
        let listed = self
            .platforms
            .iter()
            .filter(|p| !self.periods(p).is_empty());
        let extra = self
            .historical
            .iter()
            .filter(|(p, periods)| !periods.is_empty() && !self.platforms.contains(p))
            .map(|(p, _)| p);
        listed.chain(extra).collect()
    }

    /// Whether `platform` lists an archive for `period`.
    pub fn has_period(&self, platform: &Platform, period: Period) -> bool {
        self.periods(platform).binary_search(&period).is_ok()
    }

    /// The most recent `count` archived months for a platform, newest first.
    pub fn recent_periods(&self, platform: &Platform, count: usize) -> Vec<Period> {
        self.periods(platform).iter().rev().take(count).copied().collect()
    }

    /// Distinct archived months across all platforms, ascending.
    pub fn available_periods(&self) -> Vec<Period> {
        let periods: BTreeSet<Period> = self.historical.values().flatten().copied().collect();
        periods.into_iter().collect()
    }
}
