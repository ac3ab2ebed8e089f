//! Error types for Recap.

use thiserror::Error;

/// Library-level error type for Recap operations.
#[derive(Error, Debug)]
pub enum RecapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model invocation failed: {0}")]
    Model(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("All {attempted} chunk(s) failed during the map phase")]
    NoChunksSurvived { attempted: usize },

    #[error("All {attempted} strategy run(s) failed; nothing to merge")]
    NoStrategiesSucceeded { attempted: usize },

    #[error(
        "Collapse round {round} cannot converge: {tokens} estimated tokens against a budget of {budget}"
    )]
    Convergence {
        round: usize,
        tokens: usize,
        budget: usize,
    },

    #[error("Summarization was cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl RecapError {
    /// Whether this error is fatal by construction: it only arises once a whole
    /// reduction or request can no longer produce a result.
    ///
    /// Per-unit kinds (`Model`, `OpenAI`, `Http`) are not fatal here because the
    /// map phase and the ensemble drop the unit that raised them. Outside those
    /// units, such as a failed combine in a single-strategy run, they still
    /// reach the caller of `summarize` and end the request.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RecapError::NoChunksSurvived { .. }
                | RecapError::NoStrategiesSucceeded { .. }
                | RecapError::Convergence { .. }
                | RecapError::InvalidInput(_)
                | RecapError::Cancelled
        )
    }
}

/// Result type alias for Recap operations.
pub type Result<T> = std::result::Result<T, RecapError>;
