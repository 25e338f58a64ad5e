//! Per-property relevance features
//!
//! - [`heuristics`]: independent predicates over labels, URIs and values
//! - [`vector`]: the fixed-order 13-slot vector handed to the scorer

pub mod heuristics;
mod vector;

pub use vector::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector, uniqueness_ratio};
