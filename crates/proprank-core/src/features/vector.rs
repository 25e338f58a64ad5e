use serde::{Deserialize, Serialize};

/// Number of slots in a feature vector
pub const FEATURE_COUNT: usize = 13;

/// Slot names in scorer order; slot `i` is written as feature id `i + 1`
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "frequency",
    "is_of_relation",
    "is_onto",
    "has_range",
    "has_comment",
    "uniqueness_ratio",
    "autocomplete_keypress_score",
    "autocomplete_location_score",
    "value_relevant",
    "blacklisted",
    "pure_alpha",
    "word_count_score",
    "special_datatype",
];

/// Relevance signals for one property
///
/// Every slot is a plain `f64`, so a vector can't be built with a feature
/// missing. The pretrained model knows features only by position, so
/// [`FeatureVector::to_array`] is the single place that fixes the order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Share of resources of the same type having this property
    pub frequency: f64,
    pub is_of_relation: f64,
    pub is_onto: f64,
    pub has_range: f64,
    pub has_comment: f64,
    /// `1 - 1/value_count`
    pub uniqueness_ratio: f64,
    pub autocomplete_keypress_score: f64,
    pub autocomplete_location_score: f64,
    pub value_relevant: f64,
    pub blacklisted: f64,
    pub pure_alpha: f64,
    pub word_count_score: f64,
    pub special_datatype: f64,
}

impl FeatureVector {
    /// Slots in scorer order
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.frequency,
            self.is_of_relation,
            self.is_onto,
            self.has_range,
            self.has_comment,
            self.uniqueness_ratio,
            self.autocomplete_keypress_score,
            self.autocomplete_location_score,
            self.value_relevant,
            self.blacklisted,
            self.pure_alpha,
            self.word_count_score,
            self.special_datatype,
        ]
    }

    /// Inverse of [`FeatureVector::to_array`]
    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        let [
            frequency,
            is_of_relation,
            is_onto,
            has_range,
            has_comment,
            uniqueness_ratio,
            autocomplete_keypress_score,
            autocomplete_location_score,
            value_relevant,
            blacklisted,
            pure_alpha,
            word_count_score,
            special_datatype,
        ] = values;

        Self {
            frequency,
            is_of_relation,
            is_onto,
            has_range,
            has_comment,
            uniqueness_ratio,
            autocomplete_keypress_score,
            autocomplete_location_score,
            value_relevant,
            blacklisted,
            pure_alpha,
            word_count_score,
            special_datatype,
        }
    }

    /// Check that every slot holds a finite number
    pub fn is_complete(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

/// `1 - 1/value_count`; zero for a single value, approaching but never reaching 1
pub fn uniqueness_ratio(value_count: usize) -> f64 {
    if value_count == 0 {
        return 0.0;
    }
    1.0 - 1.0 / value_count as f64
}
