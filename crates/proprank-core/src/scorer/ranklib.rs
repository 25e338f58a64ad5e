//! RankLib subprocess scorer
//!
//! Runs `java -jar <jar> -load <model> -rank <features> -score <scores>`
//! with both files in a scratch directory that is removed afterwards.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::ScorerConfig;
use crate::error::{Error, Result};
use crate::retry::{RetryPolicy, with_timeout};

use super::{Scorer, ScoringCandidate, format};

const SERVICE: &str = "scorer";
const FEATURE_FILE: &str = "features.txt";
const SCORE_FILE: &str = "scores.txt";

/// Scores candidates with a pretrained RankLib model
#[derive(Debug, Clone)]
pub struct RankLibScorer {
    java_bin: String,
    jar_path: PathBuf,
    model_path: PathBuf,
    work_dir: Option<PathBuf>,
    timeout_secs: u64,
    retry: RetryPolicy,
}

impl RankLibScorer {
    pub fn from_config(config: &ScorerConfig, retry: RetryPolicy) -> Self {
        Self {
            java_bin: config.java_bin.clone(),
            jar_path: config.jar_path.clone(),
            model_path: config.model_path.clone(),
            work_dir: config.work_dir.clone(),
            timeout_secs: config.timeout_secs,
            retry,
        }
    }

    fn scratch_dir(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("proprank-");
        let dir = match &self.work_dir {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };
        Ok(dir)
    }

    async fn check_inputs(&self) -> Result<()> {
        for (what, path) in [("jar", &self.jar_path), ("model", &self.model_path)] {
            if !tokio::fs::try_exists(path).await.unwrap_or(false) {
                return Err(Error::ScorerUnavailable(format!(
                    "RankLib {} not found at {}",
                    what,
                    path.display()
                )));
            }
        }
        Ok(())
    }

    async fn invoke(&self, features: &Path, scores: &Path, expected: usize) -> Result<Vec<f64>> {
        // Stale output from a timed-out attempt must not be read back
        if tokio::fs::try_exists(scores).await.unwrap_or(false) {
            tokio::fs::remove_file(scores).await?;
        }

        debug!(
            java = %self.java_bin,
            jar = %self.jar_path.display(),
            model = %self.model_path.display(),
            "Starting RankLib"
        );

        let output = Command::new(&self.java_bin)
            .arg("-jar")
            .arg(&self.jar_path)
            .arg("-load")
            .arg(&self.model_path)
            .arg("-rank")
            .arg(features)
            .arg("-score")
            .arg(scores)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::ScorerUnavailable(format!("{}: {}", self.java_bin, e)))?;

        if !output.status.success() {
            return Err(Error::ScorerFailed {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = tokio::fs::read_to_string(scores).await.map_err(|e| {
            Error::ScorerProtocol(format!("score file {} unreadable: {}", scores.display(), e))
        })?;
        format::parse_scores(&text, expected)
    }
}

#[async_trait]
impl Scorer for RankLibScorer {
    fn name(&self) -> &str {
        "ranklib"
    }

    async fn score(&self, candidates: &[ScoringCandidate]) -> Result<Vec<f64>> {
        self.check_inputs().await?;

        let dir = self.scratch_dir()?;
        let features = dir.path().join(FEATURE_FILE);
        let scores = dir.path().join(SCORE_FILE);
        tokio::fs::write(&features, format::format_input(candidates)).await?;

        info!(candidates = candidates.len(), dir = %dir.path().display(), "Scoring with RankLib");

        let result = self
            .retry
            .run("ranklib", || {
                with_timeout(
                    SERVICE,
                    self.timeout_secs,
                    self.invoke(&features, &scores, candidates.len()),
                )
            })
            .await;

        drop(dir);
        result
    }
}
