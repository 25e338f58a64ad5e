//! Property collection and feature extraction
//!
//! Pulls a resource's triples from the graph, works out its type and the
//! normalization denominator, then feeds every accepted triple through a
//! [`RankingContext`], computing features the first time a property is seen.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::autocomplete::AutocompleteProber;
use crate::config::VocabularyConfig;
use crate::context::{Admission, PropertyRecord, RankingContext};
use crate::error::{Error, Result};
use crate::features::{FeatureVector, heuristics};
use crate::graph::{KnowledgeGraph, PropertyMetadata, RawTriple};

/// What the collector learned about the ranked resource itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceProfile {
    /// Identifier as given by the caller
    pub resource_id: String,
    pub resource_uri: String,
    pub resource_type: String,
    /// Resources sharing `resource_type`; denominator of `frequency`
    pub total_of_type: u64,
}

/// Resolve a bare resource name (`Iron_Maiden`) or full URI
///
/// Characters that cannot appear inside a SPARQL IRI are rejected.
pub fn resource_uri(resource_id: &str, namespace: &str) -> Result<String> {
    let id = resource_id.trim();
    if id.is_empty() {
        return Err(Error::InvalidInput("resource identifier is empty".to_string()));
    }

    let uri = if id.starts_with("http://") || id.starts_with("https://") {
        id.to_string()
    } else {
        format!("{}{}", namespace, id.replace(' ', "_"))
    };

    if let Some(c) = uri
        .chars()
        .find(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\'))
    {
        return Err(Error::InvalidInput(format!(
            "resource identifier contains '{}' which is not allowed in an IRI",
            c
        )));
    }

    Ok(uri)
}

/// Name typed into the suggestion service for a resource
pub fn resource_name(resource_id: &str) -> &str {
    resource_id
        .trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(resource_id)
}

/// First `rdf:type` in the ontology namespace, else the default type
pub fn infer_resource_type(triples: &[RawTriple], vocabulary: &VocabularyConfig) -> String {
    triples
        .iter()
        .find(|t| t.property_uri == vocabulary.type_predicate && vocabulary.is_ontology(&t.value))
        .map(|t| t.value.clone())
        .unwrap_or_else(|| vocabulary.default_type.clone())
}

/// Untagged values count as English
pub fn is_english(language: Option<&str>) -> bool {
    match language {
        None => true,
        Some(tag) => {
            let primary = tag.split('-').next().unwrap_or(tag);
            tag.is_empty() || primary.eq_ignore_ascii_case("en")
        }
    }
}

/// Namespace and language filter applied before any other processing
pub fn accepts(triple: &RawTriple, vocabulary: &VocabularyConfig) -> bool {
    vocabulary.accepts_predicate(&triple.property_uri) && is_english(triple.language.as_deref())
}

/// `co_occurrence / total`, defined as 0 when there is nothing to divide by
pub fn frequency(co_occurrence: u64, total_of_type: u64) -> f64 {
    if total_of_type == 0 {
        return 0.0;
    }
    co_occurrence as f64 / total_of_type as f64
}

/// Drives one resource through the graph, prober and ranking context
///
/// Holds per-run lookup caches, so build one per ranking invocation.
pub struct PropertyCollector<'a> {
    graph: &'a dyn KnowledgeGraph,
    prober: &'a AutocompleteProber,
    vocabulary: &'a VocabularyConfig,
    metadata_cache: HashMap<String, PropertyMetadata>,
    co_occurrence_cache: HashMap<String, u64>,
}

impl<'a> PropertyCollector<'a> {
    pub fn new(
        graph: &'a dyn KnowledgeGraph,
        prober: &'a AutocompleteProber,
        vocabulary: &'a VocabularyConfig,
    ) -> Self {
        Self {
            graph,
            prober,
            vocabulary,
            metadata_cache: HashMap::new(),
            co_occurrence_cache: HashMap::new(),
        }
    }

    /// Collect every accepted property of `resource_id` into `context`
    ///
    /// Incoming relations are appended after the outgoing ones when
    /// `include_incoming` is set. Fails with [`Error::ResourceNotFound`]
    /// when the graph knows nothing about the resource.
    pub async fn collect(
        &mut self,
        resource_id: &str,
        resource_namespace: &str,
        include_incoming: bool,
        context: &mut RankingContext,
    ) -> Result<ResourceProfile> {
        let uri = resource_uri(resource_id, resource_namespace)?;

        let mut triples = self.graph.outgoing_triples(&uri).await?;
        if triples.is_empty() {
            return Err(Error::ResourceNotFound(resource_id.to_string()));
        }

        let resource_type = infer_resource_type(&triples, self.vocabulary);
        let total_of_type = self.graph.count_of_type(&resource_type).await?;

        info!(
            resource = %uri,
            resource_type = %resource_type,
            total_of_type,
            triples = triples.len(),
            "Collected resource triples"
        );

        if include_incoming {
            let incoming = self.graph.incoming_triples(&uri).await?;
            debug!(resource = %uri, incoming = incoming.len(), "Collected incoming triples");
            triples.extend(incoming);
        }

        let profile = ResourceProfile {
            resource_id: resource_id.to_string(),
            resource_uri: uri,
            resource_type,
            total_of_type,
        };

        let vocabulary = self.vocabulary;
        for triple in triples.iter().filter(|t| accepts(t, vocabulary)) {
            match context.admit(triple) {
                Admission::Appended => {}
                Admission::Duplicate { key } => {
                    debug!(property = %triple.property_uri, key = %key, "Dropping property with duplicate label");
                }
                Admission::New { label } => {
                    let features = self.extract_features(&profile, triple, &label).await?;
                    context.insert(PropertyRecord::new(
                        &triple.property_uri,
                        label,
                        &triple.value,
                        features,
                        triple.direction.is_incoming(),
                    ));
                }
            }
        }

        context.finalize();

        info!(
            resource = %profile.resource_uri,
            properties = context.len(),
            "Built property records"
        );

        Ok(profile)
    }

    /// Features of a newly seen property, computed from its first triple
    ///
    /// `uniqueness_ratio` is left at 0 until [`RankingContext::finalize`].
    async fn extract_features(
        &mut self,
        profile: &ResourceProfile,
        triple: &RawTriple,
        label: &str,
    ) -> Result<FeatureVector> {
        let probe = self
            .prober
            .probe(resource_name(&profile.resource_id), label)
            .await?;
        let metadata = self.property_metadata(&triple.property_uri).await?;
        let frequency = self.frequency(profile, &triple.property_uri).await?;

        let features = FeatureVector {
            frequency,
            is_of_relation: if triple.direction.is_incoming() { 1.0 } else { 0.0 },
            is_onto: heuristics::is_ontology(&triple.property_uri, self.vocabulary),
            has_range: if metadata.has_range { 1.0 } else { 0.0 },
            has_comment: if metadata.has_comment { 1.0 } else { 0.0 },
            uniqueness_ratio: 0.0,
            autocomplete_keypress_score: probe.keypress_score,
            autocomplete_location_score: probe.location_score,
            value_relevant: heuristics::is_value_relevant(&triple.value),
            blacklisted: heuristics::is_blacklisted(label),
            pure_alpha: heuristics::is_pure_alpha_space(label),
            word_count_score: heuristics::word_count_score(label),
            special_datatype: heuristics::has_special_datatype(triple.datatype.as_deref()),
        };

        debug!(property = %triple.property_uri, label = %label, ?features, "Extracted features");
        Ok(features)
    }

    async fn property_metadata(&mut self, property_uri: &str) -> Result<PropertyMetadata> {
        if let Some(meta) = self.metadata_cache.get(property_uri) {
            return Ok(*meta);
        }
        let meta = self.graph.property_metadata(property_uri).await?;
        self.metadata_cache.insert(property_uri.to_string(), meta);
        Ok(meta)
    }

    async fn frequency(&mut self, profile: &ResourceProfile, property_uri: &str) -> Result<f64> {
        if profile.total_of_type == 0 {
            return Ok(0.0);
        }
        let count = match self.co_occurrence_cache.get(property_uri) {
            Some(count) => *count,
            None => {
                let count = self
                    .graph
                    .count_with_property(&profile.resource_type, property_uri)
                    .await?;
                self.co_occurrence_cache.insert(property_uri.to_string(), count);
                count
            }
        };
        Ok(frequency(count, profile.total_of_type))
    }
}
