//! Ranked result assembly and the JSON report
//!
//! Every scalar in the report is a string, matching what downstream
//! consumers of the ranking have always parsed:
//!
//! ```json
//! {"total": "2", "error": "0", "resources": [
//!   {"rank": "1", "property": "http://dbpedia.org/ontology/genre",
//!    "score": "0.9", "label": "genre", "is_of": "0",
//!    "values": [{"value": "Heavy metal"}]}
//! ]}
//! ```

use serde::{Deserialize, Serialize};

use crate::context::PropertyRecord;
use crate::error::{Error, Result};

/// A scored property in its final position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedProperty {
    /// 1-based
    pub rank: usize,
    pub property_uri: String,
    pub score: f64,
    pub label: String,
    pub is_of_relation: bool,
    pub values: Vec<String>,
}

/// Pair records with their scores and order them
///
/// Sorting is stable on descending score, so equal scores keep discovery
/// order.
pub fn assemble(records: Vec<PropertyRecord>, scores: &[f64]) -> Result<Vec<RankedProperty>> {
    if records.len() != scores.len() {
        return Err(Error::ScorerProtocol(format!(
            "{} scores for {} properties",
            scores.len(),
            records.len()
        )));
    }

    let mut scored: Vec<PropertyRecord> = records
        .into_iter()
        .zip(scores)
        .map(|(mut record, &score)| {
            record.score = score;
            record
        })
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));

    Ok(scored
        .into_iter()
        .enumerate()
        .map(|(i, record)| RankedProperty {
            rank: i + 1,
            property_uri: record.property_uri,
            score: record.score,
            label: record.label,
            is_of_relation: record.is_of_relation,
            values: record.values,
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportValue {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub rank: String,
    pub property: String,
    pub score: String,
    pub label: String,
    pub is_of: String,
    pub values: Vec<ReportValue>,
}

impl From<&RankedProperty> for ReportEntry {
    fn from(property: &RankedProperty) -> Self {
        Self {
            rank: property.rank.to_string(),
            property: property.property_uri.clone(),
            score: property.score.to_string(),
            label: property.label.clone(),
            is_of: if property.is_of_relation { "1" } else { "0" }.to_string(),
            values: property
                .values
                .iter()
                .map(|v| ReportValue {
                    value: v.replace('"', ""),
                })
                .collect(),
        }
    }
}

/// Output document of one ranking invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingReport {
    pub total: String,
    /// `"0"` on success, otherwise the error code
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    pub resources: Vec<ReportEntry>,
}

impl RankingReport {
    pub fn success(properties: &[RankedProperty]) -> Self {
        Self {
            total: properties.len().to_string(),
            error: "0".to_string(),
            message: None,
            suggestion: None,
            resources: properties.iter().map(ReportEntry::from).collect(),
        }
    }

    /// Error report; never carries a partial list
    pub fn failure(error: &Error) -> Self {
        Self {
            total: "0".to_string(),
            error: error.code().to_string(),
            message: Some(error.to_string()),
            suggestion: error.suggestion(),
            resources: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error == "0"
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}
