//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunables for an analysis run.
///
/// The match caps bound output size for the exhaustive scanners; they carry
/// no legal meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum matches reported per green-loan highlight pattern
    pub green_loan_match_cap: usize,
    /// Maximum matches reported per disparity pattern
    pub disparity_match_cap: usize,
    /// Upper bound on a single advisory call
    pub advisory_timeout_ms: u64,
    /// Advisory requests receive at most this many characters of text
    pub advisory_max_chars: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            green_loan_match_cap: 5,
            disparity_match_cap: 3,
            advisory_timeout_ms: 20_000,
            advisory_max_chars: 8_000,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.green_loan_match_cap == 0 {
            return Err(ConfigError::ZeroValue("green_loan_match_cap"));
        }
        if self.disparity_match_cap == 0 {
            return Err(ConfigError::ZeroValue("disparity_match_cap"));
        }
        if self.advisory_timeout_ms == 0 {
            return Err(ConfigError::ZeroValue("advisory_timeout_ms"));
        }
        if self.advisory_max_chars == 0 {
            return Err(ConfigError::ZeroValue("advisory_max_chars"));
        }
        Ok(())
    }
}
