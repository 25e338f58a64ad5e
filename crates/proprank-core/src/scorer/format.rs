//! RankLib line format
//!
//! Input, one candidate per line:
//!
//! ```text
//! 0 qid:1 1:0.25 2:0 3:1 4:1 5:0 6:0.5 7:1 8:1 9:1 10:0 11:1 12:0.5 13:0 # http://dbpedia.org/ontology/genre
//! ```
//!
//! Feature ids are 1-based positions in [`FeatureVector::to_array`]. Output
//! is one line per input line, whose last number is the score.

use std::fmt::Write as _;
use once_cell::sync::Lazy;

use regex::Regex;

use crate::error::{Error, Result};
use crate::features::{FEATURE_COUNT, FeatureVector};

use super::ScoringCandidate;

/// Every candidate of a resource is ranked within one query group
pub const QUERY_ID: u32 = 1;

/// Relevance label written in place of a real judgement
pub const PLACEHOLDER_LABEL: &str = "0";

static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?").expect("static pattern")
});

/// Render one candidate as an input line (no trailing newline)
pub fn format_line(candidate: &ScoringCandidate, label: &str) -> String {
    let mut line = format!("{} qid:{}", label, QUERY_ID);
    for (i, value) in candidate.features.to_array().iter().enumerate() {
        let _ = write!(line, " {}:{}", i + 1, value);
    }
    let _ = write!(line, " # {}", candidate.property_uri);
    line
}

/// Render a whole input file with placeholder labels
pub fn format_input(candidates: &[ScoringCandidate]) -> String {
    candidates
        .iter()
        .map(|c| format_line(c, PLACEHOLDER_LABEL) + "\n")
        .collect()
}

/// An input line read back
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub label: String,
    pub query_id: u32,
    pub candidate: ScoringCandidate,
}

/// Parse an input line; feature ids must be exactly `1..=13` in order
pub fn parse_line(line: &str) -> Result<ParsedLine> {
    let (data, property_uri) = line
        .split_once(" # ")
        .ok_or_else(|| Error::ScorerProtocol(format!("missing '# <property>' comment: {}", line)))?;

    let mut tokens = data.split_whitespace();
    let label = tokens
        .next()
        .ok_or_else(|| Error::ScorerProtocol("empty line".to_string()))?
        .to_string();

    let query_id = tokens
        .next()
        .and_then(|t| t.strip_prefix("qid:"))
        .and_then(|q| q.parse().ok())
        .ok_or_else(|| Error::ScorerProtocol(format!("missing qid: {}", line)))?;

    let mut values = [0.0; FEATURE_COUNT];
    for (i, slot) in values.iter_mut().enumerate() {
        let token = tokens.next().ok_or_else(|| {
            Error::ScorerProtocol(format!("expected {} features: {}", FEATURE_COUNT, line))
        })?;
        let (id, value) = token
            .split_once(':')
            .ok_or_else(|| Error::ScorerProtocol(format!("bad feature token '{}'", token)))?;
        if id.parse::<usize>().ok() != Some(i + 1) {
            return Err(Error::ScorerProtocol(format!(
                "feature {} out of order: '{}'",
                i + 1,
                token
            )));
        }
        *slot = value
            .parse()
            .map_err(|_| Error::ScorerProtocol(format!("bad feature value '{}'", token)))?;
    }

    if let Some(extra) = tokens.next() {
        return Err(Error::ScorerProtocol(format!("unexpected token '{}'", extra)));
    }

    Ok(ParsedLine {
        label,
        query_id,
        candidate: ScoringCandidate::new(property_uri.trim(), FeatureVector::from_array(values)),
    })
}

/// Last number on a score line
pub fn parse_score_line(line: &str) -> Result<f64> {
    let token = NUMBER
        .find_iter(line)
        .last()
        .ok_or_else(|| Error::ScorerProtocol(format!("no score on line '{}'", line)))?;
    token
        .as_str()
        .parse()
        .map_err(|_| Error::ScorerProtocol(format!("unparseable score '{}'", token.as_str())))
}

/// Parse a score file, requiring exactly `expected` non-blank lines
pub fn parse_scores(text: &str, expected: usize) -> Result<Vec<f64>> {
    let scores = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_score_line)
        .collect::<Result<Vec<_>>>()?;

    if scores.len() != expected {
        return Err(Error::ScorerProtocol(format!(
            "expected {} score lines, got {}",
            expected,
            scores.len()
        )));
    }
    Ok(scores)
}
