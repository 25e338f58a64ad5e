use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::features::FEATURE_COUNT;

use super::{Scorer, ScoringCandidate};

/// Weighted sum of the feature vector, no external process
#[derive(Debug, Clone, PartialEq)]
pub struct LinearScorer {
    weights: [f64; FEATURE_COUNT],
}

impl LinearScorer {
    pub fn new(weights: [f64; FEATURE_COUNT]) -> Self {
        Self { weights }
    }

    pub fn from_weights(weights: &[f64]) -> Result<Self> {
        let weights: [f64; FEATURE_COUNT] = weights.try_into().map_err(|_| {
            Error::ConfigError(format!(
                "linear scorer needs {} weights, got {}",
                FEATURE_COUNT,
                weights.len()
            ))
        })?;
        Ok(Self::new(weights))
    }

    pub fn weights(&self) -> &[f64; FEATURE_COUNT] {
        &self.weights
    }

    fn score_one(&self, candidate: &ScoringCandidate) -> f64 {
        candidate
            .features
            .to_array()
            .iter()
            .zip(&self.weights)
            .map(|(x, w)| x * w)
            .sum()
    }
}

#[async_trait]
impl Scorer for LinearScorer {
    fn name(&self) -> &str {
        "linear"
    }

    async fn score(&self, candidates: &[ScoringCandidate]) -> Result<Vec<f64>> {
        Ok(candidates.iter().map(|c| self.score_one(c)).collect())
    }
}
