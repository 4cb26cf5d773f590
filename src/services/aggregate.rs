//! Derived views over a set of loaded snapshots.
//!
//! Pure functions: callers pass the snapshots and, where the view depends
//! on the date, an explicit `today`.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use super::order;
use crate::models::{Event, Platform, PlatformSnapshot};

/// Latest-view bundle shown on the front page.
#[derive(Debug, Clone, Serialize)]
pub struct LatestEvents {
    pub today: NaiveDate,
    pub new_events: Vec<Event>,
    pub today_events: Vec<Event>,
}

/// Per-platform counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlatformStats {
    pub name: String,
    pub total_events: usize,
    pub new_events: usize,
    pub categories: BTreeMap<String, usize>,
    /// Absent importance counts as 0
    pub importance: BTreeMap<u8, usize>,
    pub countries: BTreeMap<String, usize>,
}

fn events(snapshots: &[PlatformSnapshot]) -> impl Iterator<Item = &Event> {
    snapshots.iter().flat_map(|snapshot| snapshot.events.iter())
}

/// Events happening on `today`, most important first.
pub fn today(snapshots: &[PlatformSnapshot], today: NaiveDate) -> Vec<Event> {
    let mut result: Vec<Event> = events(snapshots)
        .filter(|event| event.event_date == today)
        .cloned()
        .collect();
    result.sort_by(order::importance_then_time);
    result
}

/// Newly discovered events, most recently discovered first.
pub fn new_events(snapshots: &[PlatformSnapshot]) -> Vec<Event> {
    let mut result: Vec<Event> = events(snapshots)
        .filter(|event| event.is_new)
        .cloned()
        .collect();
    result.sort_by(order::discovery_desc);
    result
}

/// Events with importance of at least `min_importance`; absent counts as 0.
pub fn important(snapshots: &[PlatformSnapshot], min_importance: u8) -> Vec<Event> {
    let mut result: Vec<Event> = events(snapshots)
        .filter(|event| event.importance_rank() >= min_importance)
        .cloned()
        .collect();
    result.sort_by(order::importance_desc);
    result
}

/// Distinct categories, sorted.
pub fn categories(snapshots: &[PlatformSnapshot]) -> Vec<String> {
    let distinct: BTreeSet<&str> = events(snapshots)
        .filter_map(|event| event.category.as_deref())
        .filter(|category| !category.trim().is_empty())
        .collect();
    distinct.into_iter().map(str::to_string).collect()
}

pub fn latest(snapshots: &[PlatformSnapshot], today: NaiveDate, new_limit: usize) -> LatestEvents {
    let mut new = new_events(snapshots);
    new.truncate(new_limit);

    LatestEvents {
        today,
        new_events: new,
        today_events: self::today(snapshots, today),
    }
}

pub fn platform_stats(snapshots: &[PlatformSnapshot]) -> BTreeMap<Platform, PlatformStats> {
    let mut stats: BTreeMap<Platform, PlatformStats> = BTreeMap::new();

    for snapshot in snapshots {
        let entry = stats
            .entry(snapshot.platform.clone())
            .or_insert_with(|| PlatformStats {
                name: snapshot.platform.display_name().to_string(),
                ..PlatformStats::default()
            });

        for event in &snapshot.events {
            entry.total_events += 1;
            if event.is_new {
                entry.new_events += 1;
            }
            if let Some(category) = &event.category {
                *entry.categories.entry(category.clone()).or_default() += 1;
            }
            if let Some(country) = &event.country {
                *entry.countries.entry(country.clone()).or_default() += 1;
            }
            *entry.importance.entry(event.importance_rank()).or_default() += 1;
        }
    }

    stats
}

/// Events dated within `[from, to]`, grouped by day.
///
/// Each day is ordered by importance, then time of day.
pub fn calendar_days(
    snapshots: &[PlatformSnapshot],
    from: NaiveDate,
    to: NaiveDate,
) -> BTreeMap<NaiveDate, Vec<Event>> {
    let mut days: BTreeMap<NaiveDate, Vec<Event>> = BTreeMap::new();
    for event in events(snapshots).filter(|e| e.event_date >= from && e.event_date <= to) {
        days.entry(event.event_date).or_default().push(event.clone());
    }
    for day in days.values_mut() {
        day.sort_by(order::importance_then_time);
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::event;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn snapshot(platform: Platform, events: Vec<Event>) -> PlatformSnapshot {
        PlatformSnapshot {
            platform,
            total_events: events.len() as u64,
            events,
            last_updated: None,
        }
    }

    fn sample() -> Vec<PlatformSnapshot> {
        let mut a = event(Platform::Cls, "a", "2025-03-10");
        a.importance = Some(3);
        a.event_time = Some("10:00".into());
        a.category = Some("宏观".into());
        a.country = Some("中国".into());

        let mut b = event(Platform::Cls, "b", "2025-03-10");
        b.importance = Some(5);
        b.event_time = Some("14:00".into());
        b.is_new = true;
        b.discovery_date = Some("2025-03-08".into());
        b.category = Some("财报".into());

        let mut c = event(Platform::Investing, "c", "2025-03-11");
        c.importance = Some(4);
        c.is_new = true;
        c.category = Some("宏观".into());
        c.country = Some("美国".into());

        let mut d = event(Platform::Investing, "d", "2025-03-10");
        d.is_new = true;
        d.discovery_date = Some("2025-03-09".into());
        d.category = Some(" ".into());

        vec![
            snapshot(Platform::Cls, vec![a, b]),
            snapshot(Platform::Investing, vec![c, d]),
        ]
    }

    fn ids(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_today_sorted_by_importance_then_time() {
        let result = today(&sample(), date("2025-03-10"));
        assert_eq!(ids(&result), vec!["b", "a", "d"]);
        assert!(today(&sample(), date("2025-03-12")).is_empty());
    }

    #[test]
    fn test_new_events_missing_discovery_sorts_last() {
        let result = new_events(&sample());
        assert_eq!(ids(&result), vec!["d", "b", "c"]);
    }

    #[test]
    fn test_new_flag_encodings() {
        let payload = json!({
            "events": [
                {"id": "1", "event_date": "2025-03-10", "is_new": true},
                {"id": "2", "event_date": "2025-03-10", "is_new": "TRUE"},
                {"id": "3", "event_date": "2025-03-10", "is_new": 1},
                {"id": "4", "event_date": "2025-03-10", "is_new": "false"},
                {"id": "5", "event_date": "2025-03-10", "is_new": null},
                {"id": "6", "event_date": "2025-03-10", "is_new": 0},
                {"id": "7", "event_date": "2025-03-10"}
            ]
        });
        let snapshot: PlatformSnapshot = serde_json::from_value(payload).unwrap();
        let result = new_events(&[snapshot]);
        assert_eq!(ids(&result), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_important_threshold() {
        let result = important(&sample(), 4);
        assert_eq!(ids(&result), vec!["b", "c"]);
        assert_eq!(important(&sample(), 1).len(), 3);
    }

    #[test]
    fn test_important_zero_threshold_keeps_unrated() {
        let result = important(&sample(), 0);
        assert_eq!(ids(&result), vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn test_categories_distinct_and_sorted() {
        assert_eq!(categories(&sample()), vec!["宏观".to_string(), "财报".to_string()]);
    }

    #[test]
    fn test_latest_truncates_new_events() {
        let view = latest(&sample(), date("2025-03-10"), 2);
        assert_eq!(ids(&view.new_events), vec!["d", "b"]);
        assert_eq!(view.today_events.len(), 3);
        assert_eq!(view.today, date("2025-03-10"));
    }

    #[test]
    fn test_platform_stats() {
        let stats = platform_stats(&sample());
        let cls = &stats[&Platform::Cls];
        assert_eq!(cls.name, "财联社");
        assert_eq!(cls.total_events, 2);
        assert_eq!(cls.new_events, 1);
        assert_eq!(cls.importance.get(&5), Some(&1));

        let investing = &stats[&Platform::Investing];
        assert_eq!(investing.importance.get(&0), Some(&1));
        assert_eq!(investing.countries.get("美国"), Some(&1));
        assert_eq!(investing.new_events, 2);
    }

    #[test]
    fn test_calendar_days_grouped_and_bounded() {
        let days = calendar_days(&sample(), date("2025-03-10"), date("2025-03-10"));
        assert_eq!(days.len(), 1);
        assert_eq!(ids(&days[&date("2025-03-10")]), vec!["b", "a", "d"]);

        let days = calendar_days(&sample(), date("2025-03-01"), date("2025-03-31"));
        let dates: Vec<_> = days.keys().copied().collect();
        assert_eq!(dates, vec![date("2025-03-10"), date("2025-03-11")]);
    }
}
