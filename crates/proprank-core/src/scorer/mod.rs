//! Learning-to-rank scoring
//!
//! The pipeline hands a batch of feature vectors to a [`Scorer`] and gets
//! back one score per vector, in the same order. Two backends exist:
//!
//! - [`RankLibScorer`]: a pretrained RankLib model run as a `java`
//!   subprocess, exchanging files in the SVMlight-style line format of
//!   [`format`]
//! - [`LinearScorer`]: an in-process weighted sum over the same features

pub mod format;
mod linear;
mod ranklib;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{ScorerConfig, ScorerKind};
use crate::error::{Error, Result};
use crate::features::FeatureVector;
use crate::retry::RetryPolicy;

pub use linear::LinearScorer;
pub use ranklib::RankLibScorer;

/// One property submitted for scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringCandidate {
    pub property_uri: String,
    pub features: FeatureVector,
}

impl ScoringCandidate {
    pub fn new(property_uri: impl Into<String>, features: FeatureVector) -> Self {
        Self {
            property_uri: property_uri.into(),
            features,
        }
    }
}

/// Maps feature vectors to relevance scores
#[async_trait]
pub trait Scorer: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// One score per candidate, in candidate order
    async fn score(&self, candidates: &[ScoringCandidate]) -> Result<Vec<f64>>;
}

/// Reject any candidate whose feature vector has a non-finite slot
pub fn check_complete(candidates: &[ScoringCandidate]) -> Result<()> {
    match candidates.iter().find(|c| !c.features.is_complete()) {
        Some(c) => Err(Error::ScorerProtocol(format!(
            "incomplete feature vector for {}: {:?}",
            c.property_uri, c.features
        ))),
        None => Ok(()),
    }
}

/// Score `candidates` and enforce the one-score-per-candidate contract
pub async fn score_checked(scorer: &dyn Scorer, candidates: &[ScoringCandidate]) -> Result<Vec<f64>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }
    check_complete(candidates)?;
    let scores = scorer.score(candidates).await?;
    if scores.len() != candidates.len() {
        return Err(Error::ScorerProtocol(format!(
            "{} returned {} scores for {} candidates",
            scorer.name(),
            scores.len(),
            candidates.len()
        )));
    }
    if let Some(i) = scores.iter().position(|s| !s.is_finite()) {
        return Err(Error::ScorerProtocol(format!(
            "{} returned a non-finite score for {}",
            scorer.name(),
            candidates[i].property_uri
        )));
    }
    Ok(scores)
}

/// Build the scorer selected in configuration
pub fn from_config(config: &ScorerConfig, retry: RetryPolicy) -> Result<Box<dyn Scorer>> {
    match config.kind {
        ScorerKind::Ranklib => Ok(Box::new(RankLibScorer::from_config(config, retry))),
        ScorerKind::Linear => Ok(Box::new(LinearScorer::from_weights(&config.linear_weights)?)),
    }
}
