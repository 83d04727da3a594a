//! Selection engine - orchestrates catalog resolution, path filtering, and
//! the per-candidate metadata decision into a final list of template paths.
//!
//! Per-candidate failures never abort a batch: every dropped candidate is
//! recorded in the returned [`SelectionReport`] and emitted as a `tracing`
//! warning, and selection proceeds with whatever matched.

pub mod error;

pub use error::LoadError;

use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;

use crate::catalog::{Catalog, Resolution};
use crate::filter::{CriteriaConfig, FilterError, PathFilter, PathFilterConfig, TagFilter};
use crate::metadata::parse_metadata;

/// One dropped candidate and the reason it was dropped
#[derive(Debug)]
pub struct Diagnostic {
    /// Offending path, or the raw input when resolution itself failed
    pub path: PathBuf,
    pub error: LoadError,
}

/// Result of one selection call: the ordered, deduplicated paths that were
/// selected, plus a diagnostic per dropped candidate.
#[derive(Debug, Default)]
pub struct SelectionReport {
    pub selected: Vec<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

impl SelectionReport {
    /// True if nothing was selected and nothing failed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty() && self.diagnostics.is_empty()
    }
}

/// Template selection engine.
///
/// Holds the catalog, both filters, and the configured root inputs as
/// immutable state captured at construction. Selection calls never mutate
/// the loader, so one loader can serve concurrent callers.
pub struct TemplateLoader {
    catalog: Arc<dyn Catalog>,
    tag_filter: TagFilter,
    path_filter: PathFilter,
    roots: Vec<String>,
}

impl TemplateLoader {
    /// Build a loader from run-level options.
    ///
    /// This is where invalid configuration is rejected: a run with a bad
    /// criteria or path filter configuration refuses to start rather than
    /// failing per candidate later.
    ///
    /// # Errors
    /// Returns `FilterError` when the path filter patterns cannot be
    /// resolved. (Criteria strings are validated earlier, by
    /// `CriteriaConfig::builder().build()`.)
    pub fn new(
        catalog: Arc<dyn Catalog>,
        criteria: CriteriaConfig,
        path_config: &PathFilterConfig,
        roots: Vec<String>,
    ) -> Result<Self, FilterError> {
        let path_filter = PathFilter::new(path_config, catalog.as_ref())?;
        Ok(Self {
            catalog,
            tag_filter: TagFilter::new(criteria),
            path_filter,
            roots,
        })
    }

    /// Select templates under the configured roots, narrowed by ad-hoc
    /// tags supplied for this call.
    #[must_use]
    pub fn select_by_tags(&self, ad_hoc_tags: &[String]) -> SelectionReport {
        let _span = tracing::debug_span!("select_by_tags").entered();
        let resolution = self.catalog.resolve(&self.roots);
        self.run(resolution, ad_hoc_tags, false)
    }

    /// Select templates from an explicit input list.
    ///
    /// With `relaxed` set, the metadata match decision is bypassed and
    /// every path-filter survivor whose metadata parsed is selected.
    /// Unreadable or unparsable candidates are still dropped and reported.
    #[must_use]
    pub fn select_by_list(&self, inputs: &[String], relaxed: bool) -> SelectionReport {
        let _span = tracing::debug_span!("select_by_list", relaxed).entered();
        let resolution = self.catalog.resolve(inputs);
        self.run(resolution, &[], relaxed)
    }

    fn run(&self, resolution: Resolution, ad_hoc_tags: &[String], relaxed: bool) -> SelectionReport {
        let mut diagnostics: Vec<Diagnostic> = resolution
            .errors
            .into_iter()
            .map(|(input, error)| {
                tracing::warn!(%input, %error, "could not resolve template input");
                Diagnostic {
                    path: PathBuf::from(input),
                    error: LoadError::Resolution(error),
                }
            })
            .collect();

        let survivors = self.path_filter.apply(&resolution.paths);

        // No ordering dependency between candidates; fan out and restore
        // discovery order by index afterwards.
        let mut outcomes: Vec<(usize, PathBuf, Result<bool, LoadError>)> = survivors
            .into_par_iter()
            .enumerate()
            .map(|(index, path)| {
                let decision = parse_metadata(&path)
                    .map_err(LoadError::from)
                    .and_then(|metadata| {
                        self.tag_filter
                            .matches(&metadata, ad_hoc_tags)
                            .map_err(LoadError::from)
                    });
                (index, path, decision)
            })
            .collect();
        outcomes.sort_by_key(|(index, _, _)| *index);

        let mut selected = Vec::with_capacity(outcomes.len());
        for (_, path, decision) in outcomes {
            match decision {
                Ok(matched) if matched || relaxed => selected.push(path),
                Ok(_) => {}
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "could not load template");
                    diagnostics.push(Diagnostic { path, error });
                }
            }
        }

        tracing::debug!(
            selected = selected.len(),
            dropped = diagnostics.len(),
            "selection complete"
        );
        SelectionReport {
            selected,
            diagnostics,
        }
    }
}
