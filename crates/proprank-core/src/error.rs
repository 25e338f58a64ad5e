//! Error types for proprank

use thiserror::Error;

/// Result type alias using proprank's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Proprank error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Network errors (E100-E199)
    #[error("Network error: {0}. Check your internet connection.")]
    NetworkError(#[from] reqwest::Error),

    #[error("Request to {service} timed out after {secs} seconds")]
    Timeout { service: &'static str, secs: u64 },

    #[error("Rate limited by {0}. Try again later.")]
    RateLimited(String),

    #[error("{service} returned HTTP {status}: {body}")]
    HttpStatus {
        service: &'static str,
        status: u16,
        body: String,
    },

    // Graph errors (E200-E299)
    #[error("Graph query failed: {0}")]
    GraphQueryFailed(String),

    #[error("Malformed graph response: {0}")]
    MalformedGraphResponse(String),

    #[error("Resource '{0}' has no properties in the knowledge graph.")]
    ResourceNotFound(String),

    // Autocomplete errors (E300-E399)
    #[error("Malformed suggestion response: {0}")]
    MalformedSuggestions(String),

    // Scorer errors (E400-E499)
    #[error("Scorer failed to start: {0}")]
    ScorerUnavailable(String),

    #[error("Scorer exited with status {status}: {stderr}")]
    ScorerFailed { status: i32, stderr: String },

    #[error("Scorer protocol violation: {0}")]
    ScorerProtocol(String),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Input errors (E800-E899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::NetworkError(_) => "E100",
            Self::Timeout { .. } => "E101",
            Self::RateLimited(_) => "E102",
            Self::HttpStatus { .. } => "E103",
            Self::GraphQueryFailed(_) => "E200",
            Self::MalformedGraphResponse(_) => "E201",
            Self::ResourceNotFound(_) => "E202",
            Self::MalformedSuggestions(_) => "E300",
            Self::ScorerUnavailable(_) => "E400",
            Self::ScorerFailed { .. } => "E401",
            Self::ScorerProtocol(_) => "E402",
            Self::ConfigError(_) => "E600",
            Self::InvalidInput(_) => "E800",
            Self::Other(_) | Self::Json(_) | Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::NetworkError(_) | Self::Timeout { .. } => {
                Some("Check internet connection or raise the timeout_secs settings".to_string())
            }
            Self::GraphQueryFailed(_) | Self::MalformedGraphResponse(_) => {
                Some("proprank config get graph.endpoint".to_string())
            }
            Self::ResourceNotFound(_) => {
                Some("Check the resource name, e.g. `Iron_Maiden` rather than `Iron Maiden`".to_string())
            }
            Self::ScorerUnavailable(_) => Some("proprank config get scorer.jar_path".to_string()),
            Self::ScorerProtocol(_) => Some("proprank config get scorer.model_path".to_string()),
            Self::ConfigError(_) => Some("proprank config path".to_string()),
            _ => None,
        }
    }

    /// Whether a failed external call may succeed when attempted again
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NetworkError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Timeout { .. } | Self::RateLimited(_) | Self::ScorerUnavailable(_) => true,
            Self::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
