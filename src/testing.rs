//! Testing utilities for templar
//!
//! Fixture helpers for writing template files into temporary directories.
//! Only available when compiled with `cfg(test)`.

use std::fs;
use std::path::{Path, PathBuf};

/// Write a file with the given content, creating parent directories.
///
/// Returns the path that was written.
///
/// # Panics
/// Panics if the file cannot be created or written.
pub fn write_file(path: impl AsRef<Path>, content: &str) -> PathBuf {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    fs::write(path, content).expect("Failed to write fixture file");
    path.to_path_buf()
}

/// Write a minimal template file with the given id, tags, and severity.
///
/// Returns the path that was written.
pub fn write_template(
    dir: &Path,
    name: &str,
    id: &str,
    tags: &[&str],
    severity: &str,
) -> PathBuf {
    let content = format!(
        "id: {id}\n\
         info:\n  \
         author: tester\n  \
         severity: {severity}\n  \
         tags: {}\n\
         http:\n  \
         - method: GET\n",
        tags.join(",")
    );
    write_file(dir.join(name), &content)
}
