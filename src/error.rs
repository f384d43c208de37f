use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// A single rule whose pattern could not be compiled. The scan skips it and
/// carries on with the remaining rules.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("rule '{rule_id}' skipped: {reason}")]
pub struct RuleCompilationError {
    pub rule_id: String,
    pub reason: String,
}

impl RuleCompilationError {
    pub fn new(rule_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    RuleCompilation(#[from] RuleCompilationError),
}
