//! Error types for catalog resolution

use thiserror::Error;

/// Errors that can occur while resolving an input to candidate paths
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Input named no existing file, directory, or matching glob
    #[error("No templates found for '{0}'")]
    NotFound(String),

    /// Glob pattern could not be compiled
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// I/O error while expanding an input
    #[error("I/O error for '{input}': {source}")]
    Io {
        input: String,
        #[source]
        source: std::io::Error,
    },
}

impl CatalogError {
    pub(crate) fn invalid_pattern(pattern: &str, reason: &str) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        }
    }
}
