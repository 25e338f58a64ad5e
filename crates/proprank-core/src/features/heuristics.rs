//! Text heuristics over labels, URIs and values
//!
//! Each function returns `0.0`/`1.0` or a bounded real so the result can go
//! straight into a feature slot.

use once_cell::sync::Lazy;

use regex::Regex;

use crate::config::VocabularyConfig;

/// Substrings marking structural or navigational properties
const BLACKLISTED_SUBSTRINGS: [&str; 6] =
    [" id", "PrimaryTopicOf", "wiki", "image", "same As", "Photo"];

/// Substrings marking media files and lexical metadata rather than facts
const IRRELEVANT_VALUE_SUBSTRINGS: [&str; 6] = ["File", "wordnet", ".ogg", ".svg", ".jpg", ".png"];

static PURE_ALPHA_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z\s]*$").expect("static pattern"));

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

/// 1 if the label looks structural (ids, wiki links, images) or is too short
pub fn is_blacklisted(label: &str) -> f64 {
    flag(
        label.chars().count() < 3
            || BLACKLISTED_SUBSTRINGS
                .iter()
                .any(|needle| label.contains(needle)),
    )
}

/// 1 if the property URI lies in the ontology namespace
pub fn is_ontology(property_uri: &str, vocabulary: &VocabularyConfig) -> f64 {
    flag(vocabulary.is_ontology(property_uri))
}

/// 1 if the label holds only ASCII letters and whitespace
pub fn is_pure_alpha_space(label: &str) -> f64 {
    flag(PURE_ALPHA_SPACE.is_match(label))
}

/// Inverse word count: `1 / (spaces + 1)`
pub fn word_count_score(label: &str) -> f64 {
    1.0 / (label.matches(' ').count() as f64 + 1.0)
}

/// 0 if the value points at a media file or lexical resource
pub fn is_value_relevant(value: &str) -> f64 {
    flag(
        !IRRELEVANT_VALUE_SUBSTRINGS
            .iter()
            .any(|needle| value.contains(needle)),
    )
}

/// 1 if the value's datatype is date-like
pub fn has_special_datatype(datatype: Option<&str>) -> f64 {
    flag(datatype.is_some_and(|dt| dt.contains("date")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blacklisted_labels() {
        assert_eq!(is_blacklisted("wiki"), 1.0);
        assert_eq!(is_blacklisted("wiki Page ID"), 1.0);
        assert_eq!(is_blacklisted("is Primary Topic Of"), 0.0);
        assert_eq!(is_blacklisted("isPrimaryTopicOf"), 1.0);
        assert_eq!(is_blacklisted("owl#same As"), 1.0);
        assert_eq!(is_blacklisted("thumbnail image"), 1.0);
        assert_eq!(is_blacklisted("Photo Caption"), 1.0);
        assert_eq!(is_blacklisted("ab"), 1.0);
    }

    #[test]
    fn test_ordinary_label_not_blacklisted() {
        assert_eq!(is_blacklisted("birth Place"), 0.0);
        assert_eq!(is_blacklisted("key"), 0.0);
    }

    #[test]
    fn test_is_ontology() {
        let vocab = VocabularyConfig::default();
        assert_eq!(is_ontology("http://dbpedia.org/ontology/genre", &vocab), 1.0);
        assert_eq!(is_ontology("http://dbpedia.org/property/genre", &vocab), 0.0);
    }

    #[test]
    fn test_pure_alpha_space() {
        assert_eq!(is_pure_alpha_space("birth Place"), 1.0);
        assert_eq!(is_pure_alpha_space(""), 1.0);
        assert_eq!(is_pure_alpha_space("years Active2"), 0.0);
        assert_eq!(is_pure_alpha_space("owl#same As"), 0.0);
    }

    #[test]
    fn test_word_count_score() {
        assert_eq!(word_count_score("genre"), 1.0);
        assert_eq!(word_count_score("birth Place"), 0.5);
        assert_eq!(word_count_score("wiki Page ID"), 1.0 / 3.0);
    }

    #[test]
    fn test_value_relevance() {
        assert_eq!(is_value_relevant("http://dbpedia.org/resource/London"), 1.0);
        assert_eq!(is_value_relevant("File:Logo.svg"), 0.0);
        assert_eq!(is_value_relevant("http://wordnet-rdf.princeton.edu/x"), 0.0);
        assert_eq!(is_value_relevant("cover.png"), 0.0);
    }

    #[test]
    fn test_special_datatype() {
        assert_eq!(
            has_special_datatype(Some("http://www.w3.org/2001/XMLSchema#date")),
            1.0
        );
        assert_eq!(
            has_special_datatype(Some("http://www.w3.org/2001/XMLSchema#integer")),
            0.0
        );
        assert_eq!(has_special_datatype(None), 0.0);
    }
}
