//! Event orderings shared by queries and aggregators.
//!
//! All are meant for the stable `sort_by`, so ties keep input order.

use std::cmp::Ordering;

use crate::models::Event;

/// Importance descending, then time of day ascending.
pub fn importance_then_time(a: &Event, b: &Event) -> Ordering {
    b.importance_rank()
        .cmp(&a.importance_rank())
        .then_with(|| a.time_key().cmp(b.time_key()))
}

/// Date ascending, then time of day ascending.
pub fn date_then_time(a: &Event, b: &Event) -> Ordering {
    a.event_date
        .cmp(&b.event_date)
        .then_with(|| a.time_key().cmp(b.time_key()))
}

/// Importance descending only.
pub fn importance_desc(a: &Event, b: &Event) -> Ordering {
    b.importance_rank().cmp(&a.importance_rank())
}

/// Discovery date descending; events without one sort last.
pub fn discovery_desc(a: &Event, b: &Event) -> Ordering {
    // None < Some(_), so reversing puts missing dates at the end
    b.discovery_date.cmp(&a.discovery_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Platform, fixtures::event};

    #[test]
    fn test_importance_then_time_is_stable() {
        let mut a = event(Platform::Cls, "a", "2025-01-15");
        let mut b = event(Platform::Cls, "b", "2025-01-15");
        let mut c = event(Platform::Cls, "c", "2025-01-15");
        a.importance = Some(3);
        b.importance = Some(3);
        c.importance = Some(5);
        c.event_time = Some("15:00".into());

        let mut events = vec![a, b, c];
        events.sort_by(importance_then_time);
        let ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_missing_time_sorts_as_midnight() {
        let mut early = event(Platform::Cls, "early", "2025-01-15");
        early.event_time = Some("00:00:01".into());
        let untimed = event(Platform::Cls, "untimed", "2025-01-15");

        let mut events = vec![early, untimed];
        events.sort_by(date_then_time);
        assert_eq!(events[0].id, "untimed");
    }

    #[test]
    fn test_discovery_missing_is_oldest() {
        let mut newer = event(Platform::Cls, "newer", "2025-01-15");
        newer.discovery_date = Some("2025-01-10".into());
        let mut older = event(Platform::Cls, "older", "2025-01-15");
        older.discovery_date = Some("2025-01-02".into());
        let unknown = event(Platform::Cls, "unknown", "2025-01-15");

        let mut events = vec![unknown, older, newer];
        events.sort_by(discovery_desc);
        let ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["newer", "older", "unknown"]);
    }
}
