//! Catalog module - resolution of root directories, globs, and explicit
//! paths into concrete candidate template files.
//!
//! The catalog is the only component that touches the filesystem during
//! discovery. Consumers (the path filter and the loader) work purely on
//! the resolved candidate list.

pub mod disk;
pub mod error;

pub use disk::DiskCatalog;
pub use error::CatalogError;

use std::path::PathBuf;

/// Outcome of resolving a batch of inputs.
///
/// Unresolvable inputs never abort the batch; they are reported per input
/// alongside whatever did resolve.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Candidate paths in discovery order. May contain duplicates when
    /// multiple inputs reach the same file; deduplication is the
    /// consumer's concern.
    pub paths: Vec<PathBuf>,
    /// Per-input resolution failures, keyed by the raw input string.
    pub errors: Vec<(String, CatalogError)>,
}

impl Resolution {
    /// True if no paths were resolved and no errors were recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.errors.is_empty()
    }
}

/// Trait for resolving raw input strings to candidate template paths
pub trait Catalog: Send + Sync {
    /// Resolve a batch of inputs (directories, glob patterns, or explicit
    /// file paths) into candidate paths plus per-input errors.
    fn resolve(&self, inputs: &[String]) -> Resolution;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_resolution() {
        let resolution = Resolution::default();
        assert!(resolution.is_empty());
    }
}
