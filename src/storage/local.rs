//! Local filesystem source.
//!
//! Reads the same layout the HTTP source serves, straight from a checked-out
//! data directory. Useful for development and for serving a mirrored copy.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::storage::EventSource;

/// Local filesystem source.
#[derive(Debug, Clone)]
pub struct LocalSource {
    root_dir: PathBuf,
}

impl LocalSource {
    /// Create a new LocalSource rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }
}

#[async_trait]
impl EventSource for LocalSource {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::not_found(key)),
            Err(e) => Err(AppError::retrieval(key, e)),
        }
    }

    fn describe(&self) -> String {
        self.root_dir.display().to_string()
    }
}
