//! SPARQL 1.1 protocol client
//!
//! Issues SELECT queries over HTTP GET and decodes
//! `application/sparql-results+json`. Every query runs under a timeout and
//! is retried with backoff on transient failures.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::debug;

use crate::config::{GraphConfig, VocabularyConfig};
use crate::error::{Error, Result};
use crate::retry::{RetryPolicy, with_timeout};

use super::KnowledgeGraph;
use super::types::{Direction, PropertyMetadata, RawTriple, SparqlResponse};

const SERVICE: &str = "graph";

const RESULTS_FORMAT: &str = "application/sparql-results+json";

/// HTTP client for a SPARQL endpoint
#[derive(Clone)]
pub struct SparqlClient {
    http_client: HttpClient,
    endpoint: String,
    vocabulary: VocabularyConfig,
    timeout_secs: u64,
    retry: RetryPolicy,
}

impl std::fmt::Debug for SparqlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparqlClient")
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Builder for creating a SparqlClient
pub struct SparqlClientBuilder {
    endpoint: Option<String>,
    vocabulary: Option<VocabularyConfig>,
    timeout_secs: Option<u64>,
    retry: Option<RetryPolicy>,
}

impl Default for SparqlClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SparqlClientBuilder {
    pub fn new() -> Self {
        Self {
            endpoint: None,
            vocabulary: None,
            timeout_secs: None,
            retry: None,
        }
    }

    /// Take endpoint and timeout from the graph configuration
    pub fn config(mut self, config: &GraphConfig) -> Self {
        self.endpoint = Some(config.endpoint.clone());
        self.timeout_secs = Some(config.timeout_secs);
        self
    }

    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    pub fn vocabulary(mut self, vocabulary: VocabularyConfig) -> Self {
        self.vocabulary = Some(vocabulary);
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

    pub fn build(self) -> Result<SparqlClient> {
        let endpoint = self
            .endpoint
            .ok_or_else(|| Error::ConfigError("SPARQL endpoint is required".to_string()))?;
        let timeout_secs = self.timeout_secs.unwrap_or(GraphConfig::default().timeout_secs);

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(Error::NetworkError)?;

        Ok(SparqlClient {
            http_client,
            endpoint,
            vocabulary: self.vocabulary.unwrap_or_default(),
            timeout_secs,
            retry: self.retry.unwrap_or_default(),
        })
    }
}

impl SparqlClient {
    pub fn builder() -> SparqlClientBuilder {
        SparqlClientBuilder::new()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run a SELECT query with timeout and retry
    pub async fn select(&self, query: &str) -> Result<SparqlResponse> {
        self.retry
            .run("sparql select", || {
                with_timeout(SERVICE, self.timeout_secs, self.send_query(query))
            })
            .await
    }

    async fn send_query(&self, query: &str) -> Result<SparqlResponse> {
        debug!(endpoint = %self.endpoint, query_len = query.len(), "Sending SPARQL query");

        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[("query", query), ("format", RESULTS_FORMAT)])
            .header(reqwest::header::ACCEPT, RESULTS_FORMAT)
            .send()
            .await
            .map_err(Error::NetworkError)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                429 => Error::RateLimited(self.endpoint.clone()),
                code @ 500..=599 => Error::HttpStatus {
                    service: SERVICE,
                    status: code,
                    body,
                },
                code => Error::GraphQueryFailed(format!("HTTP {}: {}", code, body)),
            });
        }

        let body = response.text().await.map_err(Error::NetworkError)?;
        serde_json::from_str(&body)
            .map_err(|e| Error::MalformedGraphResponse(format!("Failed to parse results: {}", e)))
    }
}

#[async_trait]
impl KnowledgeGraph for SparqlClient {
    async fn outgoing_triples(&self, resource_uri: &str) -> Result<Vec<RawTriple>> {
        let query = format!(
            "SELECT DISTINCT ?prop ?value WHERE {{ <{}> ?prop ?value }}",
            resource_uri
        );
        self.select(&query).await?.into_triples(Direction::Outgoing)
    }

    async fn incoming_triples(&self, resource_uri: &str) -> Result<Vec<RawTriple>> {
        let query = format!(
            "SELECT ?prop ?value WHERE {{ ?value ?prop <{}> }}",
            resource_uri
        );
        self.select(&query).await?.into_triples(Direction::Incoming)
    }

    async fn count_of_type(&self, resource_type: &str) -> Result<u64> {
        let query = format!(
            "SELECT (COUNT(DISTINCT ?entity) AS ?count) WHERE {{ \
             ?entity <{}> ?value . ?entity <{}> <{}> }}",
            self.vocabulary.page_id_predicate, self.vocabulary.type_predicate, resource_type
        );
        self.select(&query).await?.into_count()
    }

    async fn count_with_property(&self, resource_type: &str, property_uri: &str) -> Result<u64> {
        let query = format!(
            "SELECT (COUNT(DISTINCT ?entity) AS ?count) WHERE {{ \
             ?entity <{}> ?value . ?entity <{}> <{}> }}",
            property_uri, self.vocabulary.type_predicate, resource_type
        );
        self.select(&query).await?.into_count()
    }

    async fn property_metadata(&self, property_uri: &str) -> Result<PropertyMetadata> {
        let query = format!(
            "SELECT DISTINCT ?prop ?value WHERE {{ <{}> ?prop ?value }}",
            property_uri
        );
        let response = self.select(&query).await?;
        Ok(PropertyMetadata::from_predicates(response.predicates()))
    }
}
