//! Error types for filter configuration and evaluation

use thiserror::Error;

use super::conditions::ConditionError;

/// Errors that can occur while building or applying filters
#[derive(Debug, Error)]
pub enum FilterError {
    /// Invalid criteria or path filter configuration; fatal at
    /// construction time, never deferred to per-candidate evaluation
    #[error("Invalid filter configuration: {0}")]
    Config(String),

    /// Invalid severity string in the criteria configuration
    #[error("Invalid severity '{0}' in filter configuration")]
    InvalidSeverity(String),

    /// A condition expression failed to parse or evaluate
    #[error("Condition error: {0}")]
    Condition(#[from] ConditionError),
}
