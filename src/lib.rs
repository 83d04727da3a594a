//! Templar - a selection engine for declarative rule templates
//!
//! This library discovers candidate template files through a catalog,
//! filters them by path and by metadata criteria (tags, authors,
//! severities, protocols, identifiers, and boolean conditions), and
//! produces the final set of loadable template paths. Per-file failures
//! are collected as diagnostics instead of aborting the batch.

use thiserror::Error;

pub mod catalog;
pub mod filter;
pub mod loader;
pub mod metadata;

#[cfg(test)]
pub mod testing;

pub use catalog::{Catalog, DiskCatalog, Resolution};
pub use filter::{CriteriaConfig, PathFilter, PathFilterConfig, TagFilter};
pub use loader::{Diagnostic, SelectionReport, TemplateLoader};
pub use metadata::{Severity, TemplateMetadata};

/// Error enum, contains all failure states of the crate
#[derive(Debug, Error)]
pub enum TemplarError {
    /// Catalog resolution error
    #[error("Catalog error: {0}")]
    Catalog(#[from] catalog::CatalogError),
    /// Filter configuration or evaluation error
    #[error("Filter error: {0}")]
    Filter(#[from] filter::FilterError),
    /// Metadata parse error
    #[error("Metadata error: {0}")]
    Metadata(#[from] metadata::MetadataError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
