//! Current-versus-archive routing.
//!
//! A date inside the recency window (today minus `window_days`, onwards) is
//! served from the platform's current snapshot; anything older comes from
//! the archive of the month containing it. Exactly one of the two is
//! authoritative for any given date.

use chrono::{Days, NaiveDate};

use crate::models::Period;

/// Where a date's events are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recency {
    Current,
    Historical(Period),
}

/// A contiguous slice of a date range read from a single kind of partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthBucket {
    pub period: Period,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub recency: Recency,
}

#[derive(Debug, Clone, Copy)]
pub struct RecencyClassifier {
    window_days: u32,
}

impl RecencyClassifier {
    pub fn new(window_days: u32) -> Self {
        Self { window_days }
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    /// First date still served from the current snapshot.
    pub fn cutoff(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_days(Days::new(u64::from(self.window_days)))
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn classify(&self, date: NaiveDate, today: NaiveDate) -> Recency {
        if date >= self.cutoff(today) {
            Recency::Current
        } else {
            Recency::Historical(Period::of(date))
        }
    }

    /// Split `[start, end]` into per-month buckets and route each one.
    ///
    /// Each month is clipped to the range and classified by its boundaries:
    /// a month ending before the cut-off is historical, one starting at or
    /// after it is current, and the month containing the cut-off is split in
    /// two so each half reads only the partition authoritative for it.
    /// Returns nothing when `start > end`.
    pub fn plan(&self, start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Vec<MonthBucket> {
        let cutoff = self.cutoff(today);
        let mut buckets = Vec::new();

        for period in Period::span(Period::of(start), Period::of(end)) {
            let (Some(first), Some(last)) = (period.first_day(), period.last_day()) else {
                continue;
            };
            let from = first.max(start);
            let to = last.min(end);
            if from > to {
                continue;
            }

            if to < cutoff {
                buckets.push(MonthBucket {
                    period,
                    start: from,
                    end: to,
                    recency: Recency::Historical(period),
                });
            } else if from >= cutoff {
                buckets.push(MonthBucket {
                    period,
                    start: from,
                    end: to,
                    recency: Recency::Current,
                });
            } else {
                let before = cutoff.pred_opt().unwrap_or(from);
                buckets.push(MonthBucket {
                    period,
                    start: from,
                    end: before,
                    recency: Recency::Historical(period),
                });
                buckets.push(MonthBucket {
                    period,
                    start: cutoff,
                    end: to,
                    recency: Recency::Current,
                });
            }
        }

        buckets
    }
}

impl Default for RecencyClassifier {
    fn default() -> Self {
        Self::new(7)
    }
}
