//! Knowledge graph access
//!
//! The ranking pipeline talks to the graph only through [`KnowledgeGraph`],
//! so tests can substitute an in-memory graph for the SPARQL endpoint.

mod sparql;
mod types;

use async_trait::async_trait;

use crate::error::Result;

pub use sparql::{SparqlClient, SparqlClientBuilder};
pub use types::{
    Direction, PropertyMetadata, RawTriple, SparqlResponse, SparqlResults, SparqlTerm,
};

/// Queries the ranking pipeline needs from a knowledge graph
#[async_trait]
pub trait KnowledgeGraph: Send + Sync {
    /// `(resource, ?prop, ?value)`
    async fn outgoing_triples(&self, resource_uri: &str) -> Result<Vec<RawTriple>>;

    /// `(?value, ?prop, resource)`
    async fn incoming_triples(&self, resource_uri: &str) -> Result<Vec<RawTriple>>;

    /// Number of resources of `resource_type`
    async fn count_of_type(&self, resource_type: &str) -> Result<u64>;

    /// Number of resources of `resource_type` with at least one value for `property_uri`
    async fn count_with_property(&self, resource_type: &str, property_uri: &str) -> Result<u64>;

    /// Whether the property declares a range and a comment
    async fn property_metadata(&self, property_uri: &str) -> Result<PropertyMetadata>;
}
