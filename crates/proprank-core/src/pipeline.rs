//! End-to-end ranking of one resource
//!
//! Every call starts from an empty [`RankingContext`], so a single
//! [`PropertyRanker`] can serve any number of invocations, concurrently or
//! not, without state leaking between them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::autocomplete::{AutocompleteProber, SuggestionClient};
use crate::collector::{PropertyCollector, ResourceProfile};
use crate::config::{Config, GraphConfig, VocabularyConfig};
use crate::context::RankingContext;
use crate::error::Result;
use crate::graph::{KnowledgeGraph, SparqlClient};
use crate::report::{RankedProperty, RankingReport, assemble};
use crate::retry::RetryPolicy;
use crate::scorer::{self, Scorer, ScoringCandidate, format};

/// Outcome of a successful ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResources {
    pub profile: ResourceProfile,
    pub properties: Vec<RankedProperty>,
}

/// Wires graph, prober and scorer together
#[derive(Clone)]
pub struct PropertyRanker {
    graph: Arc<dyn KnowledgeGraph>,
    prober: AutocompleteProber,
    scorer: Arc<dyn Scorer>,
    vocabulary: VocabularyConfig,
    resource_namespace: String,
    include_incoming: bool,
}

impl std::fmt::Debug for PropertyRanker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyRanker")
            .field("prober", &self.prober)
            .field("scorer", &self.scorer.name())
            .field("resource_namespace", &self.resource_namespace)
            .field("include_incoming", &self.include_incoming)
            .finish()
    }
}

impl PropertyRanker {
    pub fn new(
        graph: Arc<dyn KnowledgeGraph>,
        prober: AutocompleteProber,
        scorer: Arc<dyn Scorer>,
    ) -> Self {
        Self {
            graph,
            prober,
            scorer,
            vocabulary: VocabularyConfig::default(),
            resource_namespace: GraphConfig::default().resource_namespace,
            include_incoming: false,
        }
    }

    /// Build the production stack described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let retry = RetryPolicy::from(&config.retry);

        let graph = SparqlClient::builder()
            .config(&config.graph)
            .vocabulary(config.vocabulary.clone())
            .retry(retry)
            .build()?;

        let prober = if config.autocomplete.enabled {
            let client = SuggestionClient::builder()
                .config(&config.autocomplete)
                .retry(retry)
                .build()?;
            AutocompleteProber::new(Arc::new(client), config.autocomplete.max_prefix_len)
        } else {
            AutocompleteProber::disabled(config.autocomplete.max_prefix_len)
        };

        let scorer: Arc<dyn Scorer> = scorer::from_config(&config.scorer, retry)?.into();

        Ok(Self::new(Arc::new(graph), prober, scorer)
            .with_vocabulary(config.vocabulary.clone())
            .with_resource_namespace(&config.graph.resource_namespace)
            .with_incoming(config.ranking.include_incoming))
    }

    pub fn with_vocabulary(mut self, vocabulary: VocabularyConfig) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    pub fn with_resource_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.resource_namespace = namespace.into();
        self
    }

    /// Also rank relations pointing at the resource
    pub fn with_incoming(mut self, include: bool) -> Self {
        self.include_incoming = include;
        self
    }

    pub fn scorer_name(&self) -> &str {
        self.scorer.name()
    }

    /// Gather and featurize every property of `resource_id`
    pub async fn collect(&self, resource_id: &str) -> Result<(ResourceProfile, RankingContext)> {
        let mut context = RankingContext::new();
        let mut collector = PropertyCollector::new(self.graph.as_ref(), &self.prober, &self.vocabulary);
        let profile = collector
            .collect(
                resource_id,
                &self.resource_namespace,
                self.include_incoming,
                &mut context,
            )
            .await?;
        Ok((profile, context))
    }

    /// Rank the properties of `resource_id`, most relevant first
    pub async fn rank(&self, resource_id: &str) -> Result<RankedResources> {
        let (profile, context) = self.collect(resource_id).await?;
        let records = context.into_records();

        let candidates: Vec<ScoringCandidate> = records
            .iter()
            .map(|r| ScoringCandidate::new(&r.property_uri, r.features))
            .collect();
        let scores = scorer::score_checked(self.scorer.as_ref(), &candidates).await?;
        let properties = assemble(records, &scores)?;

        info!(
            resource = %profile.resource_uri,
            scorer = self.scorer.name(),
            properties = properties.len(),
            "Ranked properties"
        );

        Ok(RankedResources {
            profile,
            properties,
        })
    }

    /// Rank and render, turning any failure into an error report
    pub async fn rank_report(&self, resource_id: &str) -> RankingReport {
        match self.rank(resource_id).await {
            Ok(ranked) => RankingReport::success(&ranked.properties),
            Err(e) => {
                error!(resource = %resource_id, code = e.code(), error = %e, "Ranking failed");
                RankingReport::failure(&e)
            }
        }
    }

    /// Scorer input lines for `resource_id` with placeholder relevance labels
    ///
    /// Used to export training data; nothing is scored.
    pub async fn feature_lines(&self, resource_id: &str) -> Result<Vec<String>> {
        let (_, context) = self.collect(resource_id).await?;
        let candidates: Vec<ScoringCandidate> = context
            .records()
            .iter()
            .map(|r| ScoringCandidate::new(&r.property_uri, r.features))
            .collect();
        scorer::check_complete(&candidates)?;
        Ok(candidates
            .iter()
            .map(|c| format::format_line(c, format::PLACEHOLDER_LABEL))
            .collect())
    }
}
