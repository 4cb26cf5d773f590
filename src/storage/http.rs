//! HTTP source for partitions published as static files.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::SourceConfig;
use crate::storage::EventSource;
use crate::utils::{http::create_async_client, resolve_url};

/// Fetches resources with plain GET requests below a base URL.
#[derive(Clone)]
pub struct HttpSource {
    client: Client,
    base_url: Url,
}

impl HttpSource {
    /// Create a source from configuration; `base_url` must be set.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let raw = config
            .base_url
            .as_deref()
            .ok_or_else(|| AppError::config("source.base_url is not set"))?;

        // A trailing slash keeps the last path segment when joining keys
        let mut base_url = Url::parse(raw)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client: create_async_client(config)?,
            base_url,
        })
    }

    /// Absolute URL for a resource key.
    pub fn url_for(&self, key: &str) -> Result<Url> {
        resolve_url(&self.base_url, key)
    }
}

#[async_trait]
impl EventSource for HttpSource {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>> {
        let url = self.url_for(key)?;
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::retrieval(key, e))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(AppError::not_found(key)),
            status if !status.is_success() => {
                return Err(AppError::retrieval(key, format!("HTTP status {status}")));
            }
            _ => {}
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::retrieval(key, e))?;
        Ok(bytes.to_vec())
    }

    fn describe(&self) -> String {
        self.base_url.to_string()
    }
}
