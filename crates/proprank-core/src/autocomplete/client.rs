//! HTTP client for a Chrome-style suggestion endpoint
//!
//! `GET <endpoint>?client=chrome&q=<prefix>` answers with a JSON array whose
//! second element is the list of completions:
//! `["iron_maiden_", ["iron maiden albums", ...], ...]`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;
use tracing::debug;

use crate::config::AutocompleteConfig;
use crate::error::{Error, Result};
use crate::retry::{RetryPolicy, with_timeout};

use super::SuggestionService;

const SERVICE: &str = "autocomplete";

/// Suggestion service backed by HTTP
#[derive(Clone)]
pub struct SuggestionClient {
    http_client: HttpClient,
    endpoint: String,
    timeout_secs: u64,
    retry: RetryPolicy,
}

impl std::fmt::Debug for SuggestionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionClient")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Builder for SuggestionClient
pub struct SuggestionClientBuilder {
    endpoint: Option<String>,
    timeout_secs: Option<u64>,
    retry: Option<RetryPolicy>,
}

impl Default for SuggestionClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestionClientBuilder {
    pub fn new() -> Self {
        Self {
            endpoint: None,
            timeout_secs: None,
            retry: None,
        }
    }

    pub fn config(mut self, config: &AutocompleteConfig) -> Self {
        self.endpoint = Some(config.endpoint.clone());
        self.timeout_secs = Some(config.timeout_secs);
        self
    }

    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn build(self) -> Result<SuggestionClient> {
        let defaults = AutocompleteConfig::default();
        let timeout_secs = self.timeout_secs.unwrap_or(defaults.timeout_secs);

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(Error::NetworkError)?;

        Ok(SuggestionClient {
            http_client,
            endpoint: self.endpoint.unwrap_or(defaults.endpoint),
            timeout_secs,
            retry: self.retry.unwrap_or_default(),
        })
    }
}

impl SuggestionClient {
    pub fn builder() -> SuggestionClientBuilder {
        SuggestionClientBuilder::new()
    }

    async fn fetch(&self, prefix: &str) -> Result<Vec<String>> {
        debug!(prefix = %prefix, "Requesting suggestions");

        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[("client", "chrome"), ("q", prefix)])
            .send()
            .await
            .map_err(Error::NetworkError)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                429 => Error::RateLimited(self.endpoint.clone()),
                code => Error::HttpStatus {
                    service: SERVICE,
                    status: code,
                    body,
                },
            });
        }

        // The service is not strict about UTF-8
        let bytes = response.bytes().await.map_err(Error::NetworkError)?;
        parse_suggestions(&String::from_utf8_lossy(&bytes))
    }
}

#[async_trait]
impl SuggestionService for SuggestionClient {
    async fn suggest(&self, prefix: &str) -> Result<Vec<String>> {
        self.retry
            .run("suggest", || {
                with_timeout(SERVICE, self.timeout_secs, self.fetch(prefix))
            })
            .await
    }
}

/// Extract the completion list from a suggestion response body
fn parse_suggestions(body: &str) -> Result<Vec<String>> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| Error::MalformedSuggestions(format!("invalid JSON: {}", e)))?;

    let list = value
        .get(1)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::MalformedSuggestions("missing suggestion list".to_string()))?;

    Ok(list
        .iter()
        .filter_map(|item| item.as_str().map(str::to_string))
        .collect())
}
