//! Triples and SPARQL JSON result shapes

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which side of the relation the ranked resource was on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// `resource -> property -> value`
    Outgoing,
    /// `value -> property -> resource`
    Incoming,
}

impl Direction {
    pub fn is_incoming(&self) -> bool {
        matches!(self, Self::Incoming)
    }
}

/// One `(property, value)` observation about the ranked resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTriple {
    pub property_uri: String,
    pub value: String,
    pub language: Option<String>,
    pub datatype: Option<String>,
    pub direction: Direction,
}

impl RawTriple {
    pub fn outgoing(property_uri: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property_uri: property_uri.into(),
            value: value.into(),
            language: None,
            datatype: None,
            direction: Direction::Outgoing,
        }
    }

    pub fn incoming(property_uri: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            direction: Direction::Incoming,
            ..Self::outgoing(property_uri, value)
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_datatype(mut self, datatype: impl Into<String>) -> Self {
        self.datatype = Some(datatype.into());
        self
    }
}

/// Schema facts about a property itself
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMetadata {
    pub has_range: bool,
    pub has_comment: bool,
}

impl PropertyMetadata {
    /// Inspect the predicates describing a property (`<prop> ?p ?o`)
    pub fn from_predicates<'a>(predicates: impl IntoIterator<Item = &'a str>) -> Self {
        predicates
            .into_iter()
            .fold(Self::default(), |mut meta, predicate| {
                meta.has_range |= predicate.contains("range");
                meta.has_comment |= predicate.contains("comment");
                meta
            })
    }
}

/// `application/sparql-results+json` document
#[derive(Debug, Clone, Deserialize)]
pub struct SparqlResponse {
    pub results: SparqlResults,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SparqlResults {
    pub bindings: Vec<HashMap<String, SparqlTerm>>,
}

/// A bound RDF term
#[derive(Debug, Clone, Deserialize)]
pub struct SparqlTerm {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(rename = "xml:lang")]
    pub language: Option<String>,
    pub datatype: Option<String>,
}

impl SparqlResponse {
    /// Convert `?prop ?value` bindings into triples
    pub fn into_triples(self, direction: Direction) -> Result<Vec<RawTriple>> {
        self.results
            .bindings
            .into_iter()
            .map(|mut binding| {
                let prop = binding.remove("prop").ok_or_else(|| {
                    Error::MalformedGraphResponse("binding without ?prop".to_string())
                })?;
                let value = binding.remove("value").ok_or_else(|| {
                    Error::MalformedGraphResponse("binding without ?value".to_string())
                })?;
                Ok(RawTriple {
                    property_uri: prop.value,
                    value: value.value,
                    language: value.language,
                    datatype: value.datatype,
                    direction,
                })
            })
            .collect()
    }

    /// Read a single `COUNT(...)` result
    ///
    /// The variable name differs between endpoints (`?count`, Virtuoso's
    /// `callret-0`), so any numeric binding of the first row is accepted.
    /// No rows means zero.
    pub fn into_count(self) -> Result<u64> {
        let Some(row) = self.results.bindings.into_iter().next() else {
            return Ok(0);
        };
        row.values()
            .find_map(|term| term.value.trim().parse::<u64>().ok())
            .ok_or_else(|| Error::MalformedGraphResponse("count binding is not numeric".to_string()))
    }

    /// Values bound to `?prop` in each row
    pub fn predicates(&self) -> Vec<&str> {
        self.results
            .bindings
            .iter()
            .filter_map(|row| row.get("prop").map(|term| term.value.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIPLES_JSON: &str = r#"{
        "head": {"vars": ["prop", "value"]},
        "results": {"bindings": [
            {"prop": {"type": "uri", "value": "http://dbpedia.org/ontology/foundingYear"},
             "value": {"type": "typed-literal", "datatype": "http://www.w3.org/2001/XMLSchema#gYear", "value": "2004"}},
            {"prop": {"type": "uri", "value": "http://dbpedia.org/property/name"},
             "value": {"type": "literal", "xml:lang": "de", "value": "Facebook Inc."}}
        ]}
    }"#;

    #[test]
    fn test_into_triples() {
        let response: SparqlResponse = serde_json::from_str(TRIPLES_JSON).unwrap();
        let triples = response.into_triples(Direction::Outgoing).unwrap();

        assert_eq!(triples.len(), 2);
        assert_eq!(triples[0].property_uri, "http://dbpedia.org/ontology/foundingYear");
        assert_eq!(
            triples[0].datatype.as_deref(),
            Some("http://www.w3.org/2001/XMLSchema#gYear")
        );
        assert!(triples[0].language.is_none());
        assert_eq!(triples[1].language.as_deref(), Some("de"));
        assert_eq!(triples[1].direction, Direction::Outgoing);
    }

    #[test]
    fn test_into_triples_rejects_missing_variable() {
        let json = r#"{"results": {"bindings": [{"prop": {"type": "uri", "value": "x"}}]}}"#;
        let response: SparqlResponse = serde_json::from_str(json).unwrap();
        assert!(response.into_triples(Direction::Incoming).is_err());
    }

    #[test]
    fn test_into_count() {
        let json = r#"{"results": {"bindings": [{"callret-0": {"type": "typed-literal", "value": "4213"}}]}}"#;
        let response: SparqlResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.into_count().unwrap(), 4213);

        let empty: SparqlResponse = serde_json::from_str(r#"{"results": {"bindings": []}}"#).unwrap();
        assert_eq!(empty.into_count().unwrap(), 0);

        let bad = r#"{"results": {"bindings": [{"count": {"type": "literal", "value": "many"}}]}}"#;
        let response: SparqlResponse = serde_json::from_str(bad).unwrap();
        assert!(response.into_count().is_err());
    }

    #[test]
    fn test_property_metadata_from_predicates() {
        let meta = PropertyMetadata::from_predicates([
            "http://www.w3.org/1999/02/22-rdf-syntax-ns#type",
            "http://www.w3.org/2000/01/rdf-schema#range",
        ]);
        assert!(meta.has_range);
        assert!(!meta.has_comment);

        let meta = PropertyMetadata::from_predicates(["http://www.w3.org/2000/01/rdf-schema#comment"]);
        assert!(meta.has_comment);
    }

    #[test]
    fn test_triple_builders() {
        let triple = RawTriple::incoming("http://dbpedia.org/ontology/owner", "http://dbpedia.org/resource/Instagram")
            .with_language("en");
        assert!(triple.direction.is_incoming());
        assert_eq!(triple.language.as_deref(), Some("en"));
    }
}
