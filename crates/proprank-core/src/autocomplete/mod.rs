//! Autocomplete discoverability probe
//!
//! Simulates a user typing `<resource>_<label>` into a public suggestion
//! service one keypress at a time. A property that shows up after fewer
//! keypresses, and higher in the suggestion list, is one people look for.

mod client;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub use client::{SuggestionClient, SuggestionClientBuilder};

/// Source of ordered completions for a typed prefix
#[async_trait]
pub trait SuggestionService: Send + Sync {
    /// Completions for `prefix`, best first
    ///
    /// Returns [`Error::MalformedSuggestions`] when the service answered with
    /// something that is not a suggestion list.
    async fn suggest(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Outcome of probing one label
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeScore {
    /// `1 / (keypresses + 1)`
    pub keypress_score: f64,
    /// `1 / position` of the matching suggestion, 0 when never suggested
    pub location_score: f64,
    /// Keypresses needed, when a match was found
    pub keypresses: Option<usize>,
    /// 1-based position of the match
    pub location: Option<usize>,
}

impl ProbeScore {
    fn found(keypresses: usize, location: usize) -> Self {
        Self {
            keypress_score: 1.0 / (keypresses as f64 + 1.0),
            location_score: 1.0 / location as f64,
            keypresses: Some(keypresses),
            location: Some(location),
        }
    }

    /// Score after `budget` unsuccessful probes
    fn not_found(budget: usize) -> Self {
        Self {
            keypress_score: 1.0 / (budget as f64 + 1.0),
            location_score: 0.0,
            keypresses: None,
            location: None,
        }
    }

    pub fn is_match(&self) -> bool {
        self.location.is_some()
    }
}

/// Runs the incremental typing simulation against a [`SuggestionService`]
#[derive(Clone)]
pub struct AutocompleteProber {
    service: Option<Arc<dyn SuggestionService>>,
    max_prefix_len: usize,
}

impl std::fmt::Debug for AutocompleteProber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutocompleteProber")
            .field("enabled", &self.service.is_some())
            .field("max_prefix_len", &self.max_prefix_len)
            .finish()
    }
}

impl AutocompleteProber {
    pub fn new(service: Arc<dyn SuggestionService>, max_prefix_len: usize) -> Self {
        Self {
            service: Some(service),
            max_prefix_len,
        }
    }

    /// A prober that never calls out and scores every label as not found
    pub fn disabled(max_prefix_len: usize) -> Self {
        Self {
            service: None,
            max_prefix_len,
        }
    }

    /// Number of probes a label gets: prefixes of length `0..=min(len, max)`
    pub fn budget(&self, label: &str) -> usize {
        label.chars().count().min(self.max_prefix_len) + 1
    }

    /// Probe how discoverable `label` is next to `resource_name`
    ///
    /// Stops at the first suggestion containing the whole lowercased label.
    /// A malformed or rejected response counts as no match for that prefix.
    /// Transient errors reach here only once the service's retries are spent
    /// and abort the probe.
    pub async fn probe(&self, resource_name: &str, label: &str) -> Result<ProbeScore> {
        let budget = self.budget(label);
        let Some(service) = &self.service else {
            return Ok(ProbeScore::not_found(budget));
        };

        let resource = resource_name.replace(' ', "_");
        let label = label.to_lowercase();

        for keypresses in 0..budget {
            let typed: String = label.chars().take(keypresses).collect();
            let query = format!("{}_{}", resource, typed.replace(' ', "_"));

            let suggestions = match service.suggest(&query).await {
                Ok(suggestions) => suggestions,
                Err(Error::MalformedSuggestions(reason)) => {
                    warn!(query = %query, reason = %reason, "Ignoring malformed suggestions");
                    continue;
                }
                Err(e) if e.is_retryable() => return Err(e),
                Err(e) => {
                    warn!(query = %query, code = e.code(), error = %e, "Suggestion request rejected");
                    continue;
                }
            };

            if let Some(index) = suggestions
                .iter()
                .position(|candidate| candidate.to_lowercase().contains(&label))
            {
                debug!(label = %label, keypresses, location = index + 1, "Label suggested");
                return Ok(ProbeScore::found(keypresses, index + 1));
            }
        }

        debug!(label = %label, budget, "Label never suggested");
        Ok(ProbeScore::not_found(budget))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers from a fixed prefix -> suggestions table and records queries
    #[derive(Default)]
    struct ScriptedSuggestions {
        answers: HashMap<String, Result<Vec<String>>>,
        queries: Mutex<Vec<String>>,
    }

    impl ScriptedSuggestions {
        fn answer(mut self, prefix: &str, suggestions: &[&str]) -> Self {
            self.answers.insert(
                prefix.to_string(),
                Ok(suggestions.iter().map(|s| s.to_string()).collect()),
            );
            self
        }

        fn fail(mut self, prefix: &str, error: Error) -> Self {
            self.answers.insert(prefix.to_string(), Err(error));
            self
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SuggestionService for ScriptedSuggestions {
        async fn suggest(&self, prefix: &str) -> Result<Vec<String>> {
            self.queries.lock().unwrap().push(prefix.to_string());
            match self.answers.get(prefix) {
                Some(Ok(list)) => Ok(list.clone()),
                Some(Err(Error::MalformedSuggestions(m))) => {
                    Err(Error::MalformedSuggestions(m.clone()))
                }
                Some(Err(Error::RateLimited(m))) => Err(Error::RateLimited(m.clone())),
                Some(Err(Error::HttpStatus { service, status, body })) => Err(Error::HttpStatus {
                    service: *service,
                    status: *status,
                    body: body.clone(),
                }),
                Some(Err(e)) => Err(Error::Other(e.to_string())),
                None => Ok(Vec::new()),
            }
        }
    }

    #[tokio::test]
    async fn test_found_immediately_at_top() {
        let service = Arc::new(
            ScriptedSuggestions::default().answer("Iron_Maiden_", &["iron maiden genre", "iron maiden tour"]),
        );
        let prober = AutocompleteProber::new(service.clone(), 4);

        let score = prober.probe("Iron Maiden", "genre").await.unwrap();

        assert_eq!(score.keypress_score, 1.0);
        assert_eq!(score.location_score, 1.0);
        assert_eq!(service.queries(), vec!["Iron_Maiden_"]);
    }

    #[tokio::test]
    async fn test_found_after_typing() {
        let service = Arc::new(
            ScriptedSuggestions::default()
                .answer("Iron_Maiden_", &["iron maiden songs"])
                .answer("Iron_Maiden_bi", &["iron maiden bio", "iron maiden birth place", "x"]),
        );
        let prober = AutocompleteProber::new(service.clone(), 4);

        let score = prober.probe("Iron_Maiden", "birth Place").await.unwrap();

        assert_eq!(score.keypresses, Some(2));
        assert_eq!(score.location, Some(2));
        assert_eq!(score.keypress_score, 1.0 / 3.0);
        assert_eq!(score.location_score, 0.5);
        // search stops at the first match
        assert_eq!(
            service.queries(),
            vec!["Iron_Maiden_", "Iron_Maiden_b", "Iron_Maiden_bi"]
        );
    }

    #[tokio::test]
    async fn test_match_ignores_suggestion_case() {
        let service = Arc::new(
            ScriptedSuggestions::default().answer("Iron_Maiden_", &["Iron Maiden Tour", "Iron Maiden Birth Place"]),
        );
        let prober = AutocompleteProber::new(service, 4);

        let score = prober.probe("Iron_Maiden", "birth Place").await.unwrap();

        assert_eq!(score.keypresses, Some(0));
        assert_eq!(score.location, Some(2));
    }

    #[tokio::test]
    async fn test_never_found_uses_budget() {
        let service = Arc::new(ScriptedSuggestions::default());
        let prober = AutocompleteProber::new(service.clone(), 4);

        let score = prober.probe("Facebook", "founding Year").await.unwrap();

        // prefixes of length 0..=4
        assert_eq!(prober.budget("founding Year"), 5);
        assert_eq!(score.keypress_score, 1.0 / 6.0);
        assert_eq!(score.location_score, 0.0);
        assert!(!score.is_match());
        assert_eq!(
            service.queries(),
            vec![
                "Facebook_",
                "Facebook_f",
                "Facebook_fo",
                "Facebook_fou",
                "Facebook_foun"
            ]
        );
    }

    #[tokio::test]
    async fn test_short_label_budget() {
        let prober = AutocompleteProber::new(Arc::new(ScriptedSuggestions::default()), 4);
        assert_eq!(prober.budget("key"), 4);

        let score = prober.probe("Facebook", "key").await.unwrap();
        assert_eq!(score.keypress_score, 1.0 / 5.0);
    }

    #[tokio::test]
    async fn test_prefix_spaces_become_underscores() {
        let service = Arc::new(ScriptedSuggestions::default());
        let prober = AutocompleteProber::new(service.clone(), 6);

        prober.probe("Facebook", "key People").await.unwrap();

        assert!(service.queries().contains(&"Facebook_key_p".to_string()));
    }

    #[tokio::test]
    async fn test_malformed_response_continues() {
        let service = Arc::new(
            ScriptedSuggestions::default()
                .fail("Facebook_", Error::MalformedSuggestions("not json".into()))
                .answer("Facebook_o", &["facebook owner"]),
        );
        let prober = AutocompleteProber::new(service, 4);

        let score = prober.probe("Facebook", "owner").await.unwrap();

        assert_eq!(score.keypresses, Some(1));
        assert_eq!(score.location_score, 1.0);
    }

    #[tokio::test]
    async fn test_rejected_request_continues() {
        let service = Arc::new(
            ScriptedSuggestions::default()
                .fail(
                    "Facebook_",
                    Error::HttpStatus {
                        service: "autocomplete",
                        status: 403,
                        body: "blocked".into(),
                    },
                )
                .answer("Facebook_o", &["facebook owner"]),
        );
        let prober = AutocompleteProber::new(service.clone(), 4);

        let score = prober.probe("Facebook", "owner").await.unwrap();

        assert_eq!(score.keypresses, Some(1));
        assert_eq!(score.location, Some(1));
        assert_eq!(service.queries(), vec!["Facebook_", "Facebook_o"]);
    }

    #[tokio::test]
    async fn test_transient_errors_abort() {
        let service = Arc::new(
            ScriptedSuggestions::default().fail("Facebook_", Error::RateLimited("suggest".into())),
        );
        let prober = AutocompleteProber::new(service, 4);

        assert!(prober.probe("Facebook", "owner").await.is_err());
    }

    #[tokio::test]
    async fn test_disabled_prober() {
        let prober = AutocompleteProber::disabled(4);
        let score = prober.probe("Facebook", "genre").await.unwrap();
        assert_eq!(score.keypress_score, 1.0 / 6.0);
        assert_eq!(score.location_score, 0.0);
    }
}
