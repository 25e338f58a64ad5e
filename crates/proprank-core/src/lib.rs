//! Proprank Core Library
//!
//! This crate ranks the properties of a knowledge-graph resource by how
//! relevant they are to a reader, including:
//! - Label derivation from property URIs
//! - SPARQL graph access
//! - Autocomplete discoverability probing
//! - Per-property feature extraction and deduplication
//! - Learning-to-rank scoring (RankLib subprocess or in-process linear)
//! - Ranked JSON report assembly

pub mod label;
pub mod features;
pub mod graph;
pub mod autocomplete;
pub mod context;
pub mod collector;
pub mod scorer;
pub mod report;
pub mod pipeline;
pub mod retry;
pub mod config;
pub mod error;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::autocomplete::{AutocompleteProber, SuggestionService};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::features::FeatureVector;
    pub use crate::graph::{KnowledgeGraph, RawTriple};
    pub use crate::pipeline::{PropertyRanker, RankedResources};
    pub use crate::report::RankingReport;
    pub use crate::scorer::{Scorer, ScoringCandidate};
}
