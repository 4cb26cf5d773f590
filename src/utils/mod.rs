//! Utility functions and helpers.

pub mod http;

use std::sync::{Mutex, MutexGuard};

use url::Url;

use crate::error::{AppError, Result};

/// Resolve a resource key against a base URL.
///
/// Keys are always relative; an absolute key would silently escape the base,
/// so it is rejected.
pub fn resolve_url(base: &Url, key: &str) -> Result<Url> {
    let key = key.trim_start_matches('/');
    if Url::parse(key).is_ok() {
        return Err(AppError::validation(format!(
            "Resource key must be relative: {key}"
        )));
    }
    Ok(base.join(key)?)
}

/// Lock a mutex, recovering the data if a previous holder panicked.
///
/// Guarded maps only ever see whole-entry inserts, so the data is consistent
/// even after a poisoning panic.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poison| poison.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://example.com/data/").unwrap();
        assert_eq!(
            resolve_url(&base, "current/cls.json").unwrap().as_str(),
            "https://example.com/data/current/cls.json"
        );
        assert_eq!(
            resolve_url(&base, "/index.json").unwrap().as_str(),
            "https://example.com/data/index.json"
        );
        assert!(resolve_url(&base, "https://other.com/x.json").is_err());
    }

    #[test]
    fn test_lock_recovers_from_poison() {
        let mutex = std::sync::Arc::new(Mutex::new(1));
        let clone = mutex.clone();
        let _ = std::thread::spawn(move || {
            let _guard = clone.lock().unwrap();
            panic!("poison");
        })
        .join();

        assert!(mutex.is_poisoned());
        assert_eq!(*lock(&mutex), 1);
    }
}
