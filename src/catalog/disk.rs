use std::path::{Path, PathBuf};

use super::error::CatalogError;
use super::{Catalog, Resolution};

/// Extensions recognized as template files during directory expansion
const TEMPLATE_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Filesystem-backed catalog.
///
/// Resolves each input in order:
/// 1. an existing directory expands recursively to its template files,
///    sorted lexicographically for deterministic load order;
/// 2. an existing file is taken literally;
/// 3. a token containing glob metacharacters expands via [`glob`];
/// 4. anything else is reported as [`CatalogError::NotFound`].
#[derive(Debug, Default, Clone)]
pub struct DiskCatalog;

impl DiskCatalog {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn is_glob_token(token: &str) -> bool {
        token.contains('*') || token.contains('?') || token.contains('[')
    }

    fn is_template_file(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| TEMPLATE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
    }

    fn expand_directory(dir: &Path, resolution: &mut Resolution) {
        let mut found = Vec::new();
        // Escape the directory portion so metacharacters in the directory
        // name itself are matched literally.
        let escaped = glob::Pattern::escape(&dir.to_string_lossy());
        for ext in TEMPLATE_EXTENSIONS {
            let pattern = format!("{escaped}/**/*.{ext}");
            let Ok(entries) = glob::glob(&pattern) else {
                continue;
            };
            found.extend(entries.filter_map(Result::ok).filter(|p| p.is_file()));
        }
        // String comparison keeps ordering consistent across platforms
        found.sort_by(|a, b| a.to_string_lossy().cmp(&b.to_string_lossy()));
        found.dedup();
        resolution
            .paths
            .extend(found.into_iter().map(|p| canonical(&p)));
    }

    fn expand_glob(token: &str, resolution: &mut Resolution) {
        let entries = match glob::glob(token) {
            Ok(entries) => entries,
            Err(e) => {
                resolution.errors.push((
                    token.to_string(),
                    CatalogError::invalid_pattern(token, &e.to_string()),
                ));
                return;
            }
        };
        let mut found: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect();
        if found.is_empty() {
            resolution
                .errors
                .push((token.to_string(), CatalogError::NotFound(token.to_string())));
            return;
        }
        found.sort_by(|a, b| a.to_string_lossy().cmp(&b.to_string_lossy()));
        resolution
            .paths
            .extend(found.into_iter().map(|p| canonical(&p)));
    }
}

impl Catalog for DiskCatalog {
    fn resolve(&self, inputs: &[String]) -> Resolution {
        let mut resolution = Resolution::default();
        for input in inputs {
            let path = Path::new(input);
            if path.is_dir() {
                Self::expand_directory(path, &mut resolution);
            } else if path.is_file() {
                resolution.paths.push(canonical(path));
            } else if Self::is_glob_token(input) {
                Self::expand_glob(input, &mut resolution);
            } else {
                resolution
                    .errors
                    .push((input.clone(), CatalogError::NotFound(input.clone())));
            }
        }
        tracing::debug!(
            inputs = inputs.len(),
            candidates = resolution.paths.len(),
            failures = resolution.errors.len(),
            "resolved template inputs"
        );
        resolution
    }
}

/// Canonicalize a path, falling back to the raw path when the file has
/// vanished between discovery and canonicalization.
pub(crate) fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
