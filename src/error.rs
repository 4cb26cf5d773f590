// src/error.rs

//! Unified error handling for the calendar query layer.

use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for calendar operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Transport failure or non-success status with no cached fallback
    #[error("Failed to retrieve {resource}: {message}")]
    Retrieval { resource: String, message: String },

    /// Resource does not exist (HTTP 404 or missing file)
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// Payload was fetched but is not well-formed
    #[error("Malformed payload in {resource}: {message}")]
    Parse { resource: String, message: String },

    /// Date range with start after end
    #[error("Invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// Search term shorter than the minimum length
    #[error("Search query '{query}' is shorter than {min_len} characters")]
    InvalidQuery { query: String, min_len: usize },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client construction failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a retrieval error for a resource.
    pub fn retrieval(resource: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Retrieval {
            resource: resource.into(),
            message: message.to_string(),
        }
    }

    /// Create a not-found error for a resource.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a parse error for a resource.
    pub fn parse(resource: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Parse {
            resource: resource.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// True for failures to obtain a resource at all (including 404).
    pub fn is_retrieval(&self) -> bool {
        matches!(self, Self::Retrieval { .. } | Self::NotFound { .. })
    }

    /// True when the resource is known not to exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_counts_as_retrieval() {
        let err = AppError::not_found("stacks/2024/13/cls.json");
        assert!(err.is_retrieval());
        assert!(err.is_not_found());
        assert!(!AppError::parse("index.json", "eof").is_retrieval());
    }

    #[test]
    fn messages_name_the_resource() {
        let err = AppError::retrieval("current/cls.json", "connection refused");
        assert_eq!(
            err.to_string(),
            "Failed to retrieve current/cls.json: connection refused"
        );
    }
}
