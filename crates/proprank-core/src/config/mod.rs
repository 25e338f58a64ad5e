//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::features::FEATURE_COUNT;

/// Proprank configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub graph: GraphConfig,
    pub vocabulary: VocabularyConfig,
    pub autocomplete: AutocompleteConfig,
    pub scorer: ScorerConfig,
    pub retry: RetryConfig,
    pub ranking: RankingConfig,
}

/// SPARQL endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub endpoint: String,
    /// Prefix turning a bare resource name into its URI
    pub resource_namespace: String,
    pub timeout_secs: u64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://dbpedia.org/sparql".to_string(),
            resource_namespace: "http://dbpedia.org/resource/".to_string(),
            timeout_secs: 30,
        }
    }
}

/// URIs that give meaning to the raw bindings returned by the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    pub ontology_namespace: String,
    pub property_namespace: String,
    pub subject_predicate: String,
    pub type_predicate: String,
    pub page_id_predicate: String,
    pub default_type: String,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            ontology_namespace: "http://dbpedia.org/ontology/".to_string(),
            property_namespace: "http://dbpedia.org/property/".to_string(),
            subject_predicate: "http://purl.org/dc/terms/subject".to_string(),
            type_predicate: "http://www.w3.org/1999/02/22-rdf-syntax-ns#type".to_string(),
            page_id_predicate: "http://dbpedia.org/ontology/wikiPageID".to_string(),
            default_type: "http://www.w3.org/2002/07/owl#Thing".to_string(),
        }
    }
}

impl VocabularyConfig {
    /// Whether a predicate belongs to one of the namespaces worth ranking
    pub fn accepts_predicate(&self, predicate: &str) -> bool {
        predicate.starts_with(&self.ontology_namespace)
            || predicate.starts_with(&self.property_namespace)
            || predicate.starts_with(&self.subject_predicate)
    }

    pub fn is_ontology(&self, uri: &str) -> bool {
        uri.starts_with(&self.ontology_namespace)
    }
}

/// Suggestion service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutocompleteConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub max_prefix_len: usize,
    pub timeout_secs: u64,
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "http://google.com/complete/search".to_string(),
            max_prefix_len: 4,
            timeout_secs: 10,
        }
    }
}

/// Which scoring backend ranks the feature vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    #[default]
    Ranklib,
    Linear,
}

impl ScorerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ranklib => "ranklib",
            Self::Linear => "linear",
        }
    }
}

impl std::str::FromStr for ScorerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "ranklib" => Ok(Self::Ranklib),
            "linear" => Ok(Self::Linear),
            other => Err(anyhow!(
                "Invalid scorer kind: {}. Valid options: ranklib, linear",
                other
            )),
        }
    }
}

/// Learning-to-rank scorer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    pub kind: ScorerKind,
    pub java_bin: String,
    pub jar_path: PathBuf,
    pub model_path: PathBuf,
    /// Directory for feature/score exchange files; a temp dir when unset
    pub work_dir: Option<PathBuf>,
    pub timeout_secs: u64,
    pub linear_weights: Vec<f64>,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            kind: ScorerKind::Ranklib,
            java_bin: "java".to_string(),
            jar_path: PathBuf::from("RankLib-2.1-patched.jar"),
            model_path: PathBuf::from("new_model.txt"),
            work_dir: None,
            timeout_secs: 120,
            linear_weights: vec![1.0; FEATURE_COUNT],
        }
    }
}

/// Backoff policy shared by every external call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Also collect relations where the resource is the object
    pub include_incoming: bool,
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("PROPRANK_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("proprank")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or defaults if it doesn't exist
    ///
    /// `PROPRANK_SPARQL_ENDPOINT` overrides `graph.endpoint` either way.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;

        let mut config = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Config::default()
        };

        if let Ok(endpoint) = env::var("PROPRANK_SPARQL_ENDPOINT") {
            config.graph.endpoint = endpoint;
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.validate()?;

        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.graph.endpoint.trim().is_empty() {
            return Err(anyhow!("graph.endpoint must not be empty"));
        }
        if self.retry.max_attempts == 0 {
            return Err(anyhow!("retry.max_attempts must be at least 1"));
        }
        for (key, secs) in [
            ("graph.timeout_secs", self.graph.timeout_secs),
            ("autocomplete.timeout_secs", self.autocomplete.timeout_secs),
            ("scorer.timeout_secs", self.scorer.timeout_secs),
        ] {
            if secs == 0 {
                return Err(anyhow!("{} must be positive", key));
            }
        }
        if self.scorer.linear_weights.len() != FEATURE_COUNT {
            return Err(anyhow!(
                "scorer.linear_weights must contain exactly {} weights, got {}",
                FEATURE_COUNT,
                self.scorer.linear_weights.len()
            ));
        }
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "graph.endpoint" => Ok(self.graph.endpoint.clone()),
            "graph.resource_namespace" => Ok(self.graph.resource_namespace.clone()),
            "graph.timeout_secs" => Ok(self.graph.timeout_secs.to_string()),

            "vocabulary.ontology_namespace" => Ok(self.vocabulary.ontology_namespace.clone()),
            "vocabulary.property_namespace" => Ok(self.vocabulary.property_namespace.clone()),
            "vocabulary.default_type" => Ok(self.vocabulary.default_type.clone()),

            "autocomplete.enabled" => Ok(self.autocomplete.enabled.to_string()),
            "autocomplete.endpoint" => Ok(self.autocomplete.endpoint.clone()),
            "autocomplete.max_prefix_len" => Ok(self.autocomplete.max_prefix_len.to_string()),
            "autocomplete.timeout_secs" => Ok(self.autocomplete.timeout_secs.to_string()),

            "scorer.kind" => Ok(self.scorer.kind.as_str().to_string()),
            "scorer.java_bin" => Ok(self.scorer.java_bin.clone()),
            "scorer.jar_path" => Ok(self.scorer.jar_path.display().to_string()),
            "scorer.model_path" => Ok(self.scorer.model_path.display().to_string()),
            "scorer.work_dir" => Ok(self
                .scorer
                .work_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(temporary directory)".to_string())),
            "scorer.timeout_secs" => Ok(self.scorer.timeout_secs.to_string()),
            "scorer.linear_weights" => Ok(self
                .scorer
                .linear_weights
                .iter()
                .map(|w| w.to_string())
                .collect::<Vec<_>>()
                .join(", ")),

            "retry.max_attempts" => Ok(self.retry.max_attempts.to_string()),
            "retry.backoff_base_ms" => Ok(self.retry.backoff_base_ms.to_string()),

            "ranking.include_incoming" => Ok(self.ranking.include_incoming.to_string()),

            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `proprank config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "graph.endpoint" => self.graph.endpoint = value.to_string(),
            "graph.resource_namespace" => self.graph.resource_namespace = value.to_string(),
            "graph.timeout_secs" => self.graph.timeout_secs = parse_secs(key, value)?,

            "vocabulary.ontology_namespace" => {
                self.vocabulary.ontology_namespace = value.to_string()
            }
            "vocabulary.property_namespace" => {
                self.vocabulary.property_namespace = value.to_string()
            }
            "vocabulary.default_type" => self.vocabulary.default_type = value.to_string(),

            "autocomplete.enabled" => {
                self.autocomplete.enabled = value
                    .parse()
                    .with_context(|| format!("Invalid boolean for {}: {}", key, value))?;
            }
            "autocomplete.endpoint" => self.autocomplete.endpoint = value.to_string(),
            "autocomplete.max_prefix_len" => {
                self.autocomplete.max_prefix_len = value
                    .parse()
                    .with_context(|| format!("Invalid max_prefix_len value: {}", value))?;
            }
            "autocomplete.timeout_secs" => {
                self.autocomplete.timeout_secs = parse_secs(key, value)?
            }

            "scorer.kind" => self.scorer.kind = value.parse()?,
            "scorer.java_bin" => self.scorer.java_bin = value.to_string(),
            "scorer.jar_path" => self.scorer.jar_path = PathBuf::from(value),
            "scorer.model_path" => self.scorer.model_path = PathBuf::from(value),
            "scorer.work_dir" => {
                self.scorer.work_dir = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            "scorer.timeout_secs" => self.scorer.timeout_secs = parse_secs(key, value)?,
            "scorer.linear_weights" => {
                let weights = value
                    .split(',')
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .map(|s| {
                        s.parse::<f64>()
                            .with_context(|| format!("Invalid weight: {}", s))
                    })
                    .collect::<anyhow::Result<Vec<_>>>()?;
                if weights.len() != FEATURE_COUNT {
                    return Err(anyhow!(
                        "Expected {} comma-separated weights, got {}",
                        FEATURE_COUNT,
                        weights.len()
                    ));
                }
                self.scorer.linear_weights = weights;
            }

            "retry.max_attempts" => {
                let attempts: u32 = value
                    .parse()
                    .with_context(|| format!("Invalid max_attempts value: {}", value))?;
                if attempts == 0 {
                    return Err(anyhow!("retry.max_attempts must be at least 1"));
                }
                self.retry.max_attempts = attempts;
            }
            "retry.backoff_base_ms" => {
                self.retry.backoff_base_ms = value
                    .parse()
                    .with_context(|| format!("Invalid backoff_base_ms value: {}", value))?;
            }

            "ranking.include_incoming" => {
                self.ranking.include_incoming = value
                    .parse()
                    .with_context(|| format!("Invalid boolean for {}: {}", key, value))?;
            }

            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `proprank config list` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = [
            "graph.endpoint",
            "graph.resource_namespace",
            "graph.timeout_secs",
            "vocabulary.ontology_namespace",
            "vocabulary.property_namespace",
            "vocabulary.default_type",
            "autocomplete.enabled",
            "autocomplete.endpoint",
            "autocomplete.max_prefix_len",
            "autocomplete.timeout_secs",
            "scorer.kind",
            "scorer.java_bin",
            "scorer.jar_path",
            "scorer.model_path",
            "scorer.work_dir",
            "scorer.timeout_secs",
            "scorer.linear_weights",
            "retry.max_attempts",
            "retry.backoff_base_ms",
            "ranking.include_incoming",
        ];

        keys.into_iter()
            .map(|key| {
                let value = self.get(key)?;
                Ok((key.to_string(), value))
            })
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}

fn parse_secs(key: &str, value: &str) -> anyhow::Result<u64> {
    let secs: u64 = value
        .parse()
        .with_context(|| format!("Invalid {} value: {}", key, value))?;
    if secs == 0 {
        return Err(anyhow!("{} must be greater than zero", key));
    }
    Ok(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.graph.endpoint, "http://dbpedia.org/sparql");
        assert_eq!(config.autocomplete.max_prefix_len, 4);
        assert_eq!(config.scorer.kind, ScorerKind::Ranklib);
        assert_eq!(config.scorer.linear_weights.len(), FEATURE_COUNT);
        assert!(!config.ranking.include_incoming);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_vocabulary_accepts_predicate() {
        let vocab = VocabularyConfig::default();
        assert!(vocab.accepts_predicate("http://dbpedia.org/ontology/birthPlace"));
        assert!(vocab.accepts_predicate("http://dbpedia.org/property/name"));
        assert!(vocab.accepts_predicate("http://purl.org/dc/terms/subject"));
        assert!(!vocab.accepts_predicate("http://www.w3.org/2000/01/rdf-schema#label"));
        assert!(!vocab.accepts_predicate("http://xmlns.com/foaf/0.1/name"));
    }

    #[test]
    fn test_get_set_roundtrip() {
        let mut config = Config::default();
        config.set("graph.endpoint", "http://localhost:8890/sparql").unwrap();
        assert_eq!(config.get("graph.endpoint").unwrap(), "http://localhost:8890/sparql");

        config.set("scorer.kind", "linear").unwrap();
        assert_eq!(config.scorer.kind, ScorerKind::Linear);

        config.set("ranking.include_incoming", "true").unwrap();
        assert!(config.ranking.include_incoming);

        config.set("scorer.work_dir", "").unwrap();
        assert!(config.scorer.work_dir.is_none());
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let mut config = Config::default();
        assert!(config.set("retry.max_attempts", "0").is_err());
        assert!(config.set("graph.timeout_secs", "0").is_err());
        assert!(config.set("scorer.kind", "svm").is_err());
        assert!(config.set("scorer.linear_weights", "1,2,3").is_err());
        assert!(config.set("autocomplete.enabled", "maybe").is_err());
        assert!(config.set("no.such.key", "1").is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeouts() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.graph.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.autocomplete.timeout_secs = 0;
        assert!(config.validate().is_err());

        let config: Config = toml::from_str("[scorer]\ntimeout_secs = 0\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("scorer.timeout_secs"));
    }

    #[test]
    fn test_list_covers_every_key() {
        let config = Config::default();
        let entries = config.list().unwrap();
        assert_eq!(entries.len(), 20);
        assert!(entries.iter().any(|(k, _)| k == "scorer.model_path"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [graph]
            endpoint = "http://localhost:8890/sparql"

            [scorer]
            kind = "linear"
            "#,
        )
        .unwrap();
        assert_eq!(config.graph.endpoint, "http://localhost:8890/sparql");
        assert_eq!(config.graph.timeout_secs, 30);
        assert_eq!(config.scorer.kind, ScorerKind::Linear);
        assert_eq!(config.autocomplete.max_prefix_len, 4);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.vocabulary.default_type, config.vocabulary.default_type);
        assert_eq!(parsed.scorer.jar_path, config.scorer.jar_path);
    }
}
