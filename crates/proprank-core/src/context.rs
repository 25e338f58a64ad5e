//! Per-invocation ranking state
//!
//! A [`RankingContext`] is created empty for every ranking run and dropped
//! when the run ends. It decides, triple by triple, whether a property is
//! new, already known, or a duplicate of a label claimed earlier.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::features::{FeatureVector, uniqueness_ratio};
use crate::graph::RawTriple;
use crate::label::{derive_label, normalized_key};

/// Everything known about one ranked property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub property_uri: String,
    pub label: String,
    /// Values in discovery order, duplicates kept; never empty
    pub values: Vec<String>,
    pub features: FeatureVector,
    pub score: f64,
    pub is_of_relation: bool,
}

impl PropertyRecord {
    pub fn new(
        property_uri: impl Into<String>,
        label: impl Into<String>,
        first_value: impl Into<String>,
        features: FeatureVector,
        is_of_relation: bool,
    ) -> Self {
        Self {
            property_uri: property_uri.into(),
            label: label.into(),
            values: vec![first_value.into()],
            features,
            score: 0.0,
            is_of_relation,
        }
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }
}

/// What [`RankingContext::admit`] did with a triple
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The property already had a record; the value was appended
    Appended,
    /// Another property already claimed this label; the triple is discarded
    Duplicate { key: String },
    /// First sighting; the label key is now claimed and the caller must
    /// build features and [`RankingContext::insert`] the record
    New { label: String },
}

/// Accumulates property records for one resource
#[derive(Debug, Default)]
pub struct RankingContext {
    records: Vec<PropertyRecord>,
    index: HashMap<String, usize>,
    seen_keys: HashSet<String>,
    dropped: HashSet<String>,
}

impl RankingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a triple: append to its record, drop it, or claim its label
    pub fn admit(&mut self, triple: &RawTriple) -> Admission {
        if let Some(&i) = self.index.get(&triple.property_uri) {
            self.records[i].values.push(triple.value.clone());
            return Admission::Appended;
        }

        let label = derive_label(&triple.property_uri);
        let key = normalized_key(&label);
        if !self.seen_keys.insert(key.clone()) {
            self.dropped.insert(triple.property_uri.clone());
            return Admission::Duplicate { key };
        }

        Admission::New { label }
    }

    /// Store the record for a property whose label was just claimed
    pub fn insert(&mut self, record: PropertyRecord) {
        debug_assert!(!self.index.contains_key(&record.property_uri));
        self.index
            .insert(record.property_uri.clone(), self.records.len());
        self.records.push(record);
    }

    /// Fill in the uniqueness ratio now that every value has been seen
    pub fn finalize(&mut self) {
        for record in &mut self.records {
            record.features.uniqueness_ratio = uniqueness_ratio(record.value_count());
        }
    }

    pub fn get(&self, property_uri: &str) -> Option<&PropertyRecord> {
        self.index.get(property_uri).map(|&i| &self.records[i])
    }

    pub fn value_count(&self, property_uri: &str) -> usize {
        self.get(property_uri).map_or(0, PropertyRecord::value_count)
    }

    /// Records in discovery order
    pub fn records(&self) -> &[PropertyRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<PropertyRecord> {
        self.records
    }

    /// Property URIs discarded because their label was already taken
    pub fn dropped(&self) -> impl Iterator<Item = &str> {
        self.dropped.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
