//! Lenient field deserializers for partition payloads.
//!
//! The collection pipeline writes fields inconsistently (null vs. missing,
//! empty strings, mixed truthy encodings), so normalization happens once
//! here, at the ingestion boundary.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// `null` or missing becomes `T::default()`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A list whose malformed records are dropped instead of failing the whole
/// payload. `null` or missing becomes an empty list.
pub fn skip_malformed<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let records = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(records
        .into_iter()
        .filter_map(|record| {
            let id = record
                .get("id")
                .or_else(|| record.get("event_id"))
                .map(Value::to_string)
                .unwrap_or_else(|| "<no id>".to_string());
            match serde_json::from_value(record) {
                Ok(item) => Some(item),
                Err(e) => {
                    log::warn!("Skipping malformed record {}: {}", id, e);
                    None
                }
            }
        })
        .collect())
}

/// Blank strings become `None`.
pub fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Coerce the tri-state `is_new` encoding into a plain bool.
pub fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().is_some_and(is_truthy))
}

/// `true`, `"true"` and `1` are true; anything else is false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_i64() == Some(1) || n.as_f64() == Some(1.0),
        _ => false,
    }
}

/// Importance as a small integer; accepts numbers and numeric strings.
pub fn importance<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let number = match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(number.and_then(|n| u8::try_from(n).ok()))
}
