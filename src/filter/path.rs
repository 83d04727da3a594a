//! Path-based include/exclude filter.
//!
//! Patterns are resolved to concrete files through the catalog once at
//! construction; applying the filter is pure set membership plus
//! directory-prefix containment and never walks the filesystem.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::error::FilterError;
use crate::catalog::disk::canonical;
use crate::catalog::{Catalog, CatalogError};

/// Include/exclude path pattern lists for one run
#[derive(Debug, Default, Clone)]
pub struct PathFilterConfig {
    /// Patterns whose matches are the only candidates allowed through;
    /// empty means no restriction
    pub included: Vec<String>,
    /// Patterns whose matches are dropped regardless of includes
    pub excluded: Vec<String>,
}

/// Resolved path filter; exclude always wins over include
#[derive(Debug)]
pub struct PathFilter {
    include_configured: bool,
    included: BTreeSet<PathBuf>,
    included_dirs: Vec<PathBuf>,
    excluded: BTreeSet<PathBuf>,
    excluded_dirs: Vec<PathBuf>,
}

impl PathFilter {
    /// Resolve the configured pattern lists through the catalog.
    ///
    /// A pattern matching nothing contributes an empty set; only a
    /// syntactically invalid pattern is a configuration error.
    ///
    /// # Errors
    /// Returns `FilterError::Config` when a pattern cannot be compiled.
    pub fn new(config: &PathFilterConfig, catalog: &dyn Catalog) -> Result<Self, FilterError> {
        let (included, included_dirs) = resolve_patterns(&config.included, catalog)?;
        let (excluded, excluded_dirs) = resolve_patterns(&config.excluded, catalog)?;
        Ok(Self {
            include_configured: !config.included.is_empty(),
            included,
            included_dirs,
            excluded,
            excluded_dirs,
        })
    }

    /// Apply the filter to a candidate list.
    ///
    /// The result preserves discovery order and contains each canonical
    /// path at most once, even when multiple input specifications reached
    /// the same file.
    #[must_use]
    pub fn apply(&self, candidates: &[PathBuf]) -> Vec<PathBuf> {
        let mut seen = BTreeSet::new();
        let mut survivors = Vec::new();
        for candidate in candidates {
            let path = canonical(candidate);
            if !seen.insert(path.clone()) {
                continue;
            }
            if self.is_excluded(&path) {
                continue;
            }
            if !self.is_included(&path) {
                continue;
            }
            survivors.push(path);
        }
        survivors
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.excluded.contains(path) || under_any(path, &self.excluded_dirs)
    }

    fn is_included(&self, path: &Path) -> bool {
        if !self.include_configured {
            return true;
        }
        self.included.contains(path) || under_any(path, &self.included_dirs)
    }
}

fn under_any(path: &Path, dirs: &[PathBuf]) -> bool {
    dirs.iter().any(|dir| path.starts_with(dir))
}

fn resolve_patterns(
    patterns: &[String],
    catalog: &dyn Catalog,
) -> Result<(BTreeSet<PathBuf>, Vec<PathBuf>), FilterError> {
    let mut files = BTreeSet::new();
    let mut dirs = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_dir() {
            // Keep the directory itself for prefix containment so files
            // created under it after construction are still covered.
            dirs.push(canonical(path));
            continue;
        }
        let resolution = catalog.resolve(std::slice::from_ref(pattern));
        for (input, error) in resolution.errors {
            match error {
                // A filter pattern naming nothing is an empty contribution
                CatalogError::NotFound(_) => {}
                other => {
                    return Err(FilterError::Config(format!("'{input}': {other}")));
                }
            }
        }
        files.extend(resolution.paths);
    }
    Ok((files, dirs))
}
