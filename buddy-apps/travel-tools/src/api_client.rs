//!  Travel Buddy Tools
//!
//!  Copyright (C) 2026  Travel Buddy Contributors
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! # JSON API Client
//!
//! One-shot GET requests against JSON upstreams (SerpApi, CurrencyFreaks).

use anyhow::{Context, Result};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Query parameters whose values must never reach the logs.
const SECRET_PARAMS: [&str; 2] = ["api_key", "apikey"];

#[derive(Debug, Error)]
pub enum ApiError {
    /// Built through [`ApiError::transport`], which strips the request URI.
    #[error("API request failed: {0}")]
    Transport(wreq::Error),

    #[error("API request failed: HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("API request failed: invalid JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    Upstream(String),

    #[error("{0}")]
    NoResults(String),
}

impl ApiError {
    /// wreq errors carry the request URI, query string and credentials included.
    fn transport(e: wreq::Error) -> Self {
        ApiError::Transport(e.without_uri())
    }
}

#[derive(Clone)]
pub struct JsonApiClient {
    client: Arc<wreq::Client>,
}

impl JsonApiClient {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = wreq::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    pub async fn get_json(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<Value, ApiError> {
        let url = build_query_url(endpoint, query);
        tracing::info!("GET {}", redacted_url(endpoint, query));

        let start = std::time::Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ApiError::transport)?;
        let status = response.status();
        let body = response.text().await.map_err(ApiError::transport)?;
        tracing::debug!(
            "[get_json] HTTP {} in {:?}, {} bytes",
            status.as_u16(),
            start.elapsed(),
            body.len()
        );

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Appends percent-encoded `query` pairs to `endpoint`.
pub fn build_query_url(endpoint: &str, query: &[(&str, String)]) -> String {
    if query.is_empty() {
        return endpoint.to_string();
    }
    let pairs = query
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    let sep = if endpoint.contains('?') { '&' } else { '?' };
    format!("{}{}{}", endpoint, sep, pairs)
}

/// Same as [`build_query_url`] with `api_key` / `apikey` values masked.
pub fn redacted_url(endpoint: &str, query: &[(&str, String)]) -> String {
    build_query_url(endpoint, &redacted(query))
}

fn redacted<'a>(query: &[(&'a str, String)]) -> Vec<(&'a str, String)> {
    query
        .iter()
        .map(|(k, v)| {
            if SECRET_PARAMS.contains(k) {
                (*k, "***".to_string())
            } else {
                (*k, v.clone())
            }
        })
        .collect()
}

/// Upstreams report failures as `{"error": "..."}`; otherwise keep a preview of the body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.chars().take(500).collect())
}
