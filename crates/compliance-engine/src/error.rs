//! Error types for the compliance engine
//!
//! Analysis itself never fails: advisory problems degrade to rule-only
//! results and malformed content flattens to empty text. These errors only
//! surface at the configuration and advisory-transport seams.

use thiserror::Error;

/// Failure talking to an advisory service
#[derive(Error, Debug)]
pub enum AdvisoryError {
    #[error("Advisory service not configured")]
    Unavailable,

    #[error("Advisory request failed: {0}")]
    Transport(String),

    #[error("Advisory request timed out after {0}ms")]
    Timeout(u64),

    #[error("Malformed advisory response: {0}")]
    MalformedResponse(String),
}

impl From<serde_json::Error> for AdvisoryError {
    fn from(err: serde_json::Error) -> Self {
        AdvisoryError::MalformedResponse(err.to_string())
    }
}

/// Invalid engine configuration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),
}
