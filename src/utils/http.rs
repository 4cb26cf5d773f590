// src/utils/http.rs

//! HTTP client utilities.

use reqwest::Client;

use crate::error::Result;
use crate::models::SourceConfig;

/// Create a configured asynchronous HTTP client.
///
/// The client timeout bounds every fetch so an unreachable host surfaces as
/// a retrieval error instead of an unbounded wait.
pub fn create_async_client(config: &SourceConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(config.timeout())
        .build()?;
    Ok(client)
}
