// src/pipeline/render.rs

use serde::Serialize;

use crate::error::Result;
use crate::models::Event;

/// Default one-line rendering of an event.
pub const EVENT_TEMPLATE: &str = "{date} {time}  [{platform}] {title} ({importance})";

/// Render events as text lines, or as pretty JSON.
pub fn render_events(events: &[Event], as_json: bool) -> Result<String> {
    if as_json {
        return to_json(events);
    }
    Ok(events
        .iter()
        .map(|event| event.format(EVENT_TEMPLATE))
        .collect::<Vec<_>>()
        .join("\n"))
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
