//! Error types for per-candidate load failures

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::filter::FilterError;
use crate::metadata::MetadataError;

/// Reason a candidate was dropped from a selection batch.
///
/// Always local to one candidate; never propagated to abort the batch.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Input could not be resolved to any template file
    #[error("Resolution failed: {0}")]
    Resolution(#[from] CatalogError),

    /// Candidate metadata could not be parsed
    #[error("Metadata parse failed: {0}")]
    Parse(#[from] MetadataError),

    /// A configured condition could not be evaluated for this candidate
    #[error("Filter failed: {0}")]
    Filter(#[from] FilterError),
}
