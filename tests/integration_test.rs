//! Integration tests for templar
//!
//! These tests verify end-to-end selection over real template trees
//! written into temporary directories.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use templar::loader::LoadError;
use templar::{CriteriaConfig, DiskCatalog, PathFilterConfig, TemplateLoader};

/// Helper to write a template file, creating parent directories
fn write_template(
    root: &Path,
    rel: &str,
    id: &str,
    tags: &[&str],
    severity: &str,
) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let content = format!(
        "id: {id}\ninfo:\n  author: tester\n  severity: {severity}\n  tags: {}\nhttp:\n  - method: GET\n",
        tags.join(",")
    );
    fs::write(&path, content).unwrap();
    path
}

fn loader_with(root: &TempDir, criteria: CriteriaConfig, paths: &PathFilterConfig) -> TemplateLoader {
    TemplateLoader::new(
        Arc::new(DiskCatalog::new()),
        criteria,
        paths,
        vec![root.path().to_string_lossy().into_owned()],
    )
    .unwrap()
}

fn names(selected: &[PathBuf]) -> Vec<String> {
    selected
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_include_tags_with_exclude_severity() {
    let root = TempDir::new().unwrap();
    write_template(root.path(), "a.yaml", "a", &["cve"], "high");
    write_template(root.path(), "b.yaml", "b", &["cve"], "info");
    write_template(root.path(), "c.yaml", "c", &["misc"], "high");

    let criteria = CriteriaConfig::builder()
        .tags(vec!["cve".to_string()])
        .exclude_severities(vec!["info".to_string()])
        .build()
        .unwrap();
    let loader = loader_with(&root, criteria, &PathFilterConfig::default());

    let report = loader.select_by_tags(&[]);
    assert_eq!(names(&report.selected), vec!["a.yaml"]);
    assert!(report.diagnostics.is_empty());
}

#[test]
fn test_excluded_directory_is_dropped_even_when_tags_match() {
    let root = TempDir::new().unwrap();
    write_template(root.path(), "live/a.yaml", "a", &["cve"], "high");
    write_template(root.path(), "deprecated/b.yaml", "b", &["cve"], "high");

    let paths = PathFilterConfig {
        included: Vec::new(),
        excluded: vec![root.path().join("deprecated").to_string_lossy().into_owned()],
    };
    let criteria = CriteriaConfig::builder()
        .tags(vec!["cve".to_string()])
        .build()
        .unwrap();
    let loader = loader_with(&root, criteria, &paths);

    let report = loader.select_by_tags(&[]);
    assert_eq!(names(&report.selected), vec!["a.yaml"]);
}

#[test]
fn test_resolution_and_parse_failures_each_appear_once() {
    let root = TempDir::new().unwrap();
    write_template(root.path(), "good.yaml", "good", &["cve"], "high");
    fs::write(root.path().join("broken.yaml"), "id: [unbalanced\n").unwrap();

    let loader = loader_with(
        &root,
        CriteriaConfig::default(),
        &PathFilterConfig::default(),
    );
    let inputs = vec![
        root.path().to_string_lossy().into_owned(),
        "no-such-template.yaml".to_string(),
    ];

    let report = loader.select_by_list(&inputs, false);
    assert_eq!(names(&report.selected), vec!["good.yaml"]);
    assert_eq!(report.diagnostics.len(), 2);

    let resolution_failures = report
        .diagnostics
        .iter()
        .filter(|d| matches!(d.error, LoadError::Resolution(_)))
        .count();
    let parse_failures = report
        .diagnostics
        .iter()
        .filter(|d| matches!(d.error, LoadError::Parse(_)))
        .count();
    assert_eq!(resolution_failures, 1);
    assert_eq!(parse_failures, 1);
}

#[test]
fn test_relaxed_selection_keeps_every_path_filter_survivor() {
    let root = TempDir::new().unwrap();
    write_template(root.path(), "a.yaml", "a", &["cve"], "high");
    write_template(root.path(), "b.yaml", "b", &["misc"], "low");
    write_template(root.path(), "deprecated/c.yaml", "c", &["cve"], "high");

    let paths = PathFilterConfig {
        included: Vec::new(),
        excluded: vec![root.path().join("deprecated").to_string_lossy().into_owned()],
    };
    let criteria = CriteriaConfig::builder()
        .tags(vec!["cve".to_string()])
        .build()
        .unwrap();
    let loader = loader_with(&root, criteria, &paths);
    let inputs = vec![root.path().to_string_lossy().into_owned()];

    let strict = loader.select_by_list(&inputs, false);
    assert_eq!(names(&strict.selected), vec!["a.yaml"]);

    // Relaxed mode bypasses the metadata decision but not the path filter
    let relaxed = loader.select_by_list(&inputs, true);
    assert_eq!(names(&relaxed.selected), vec!["a.yaml", "b.yaml"]);
}

#[test]
fn test_selection_is_idempotent_and_duplicate_free() {
    let root = TempDir::new().unwrap();
    let a = write_template(root.path(), "a.yaml", "a", &["cve"], "high");
    write_template(root.path(), "b.yaml", "b", &["cve"], "low");

    let loader = loader_with(
        &root,
        CriteriaConfig::default(),
        &PathFilterConfig::default(),
    );
    // The same file is reachable via the directory and an explicit path
    let inputs = vec![
        root.path().to_string_lossy().into_owned(),
        a.to_string_lossy().into_owned(),
    ];

    let first = loader.select_by_list(&inputs, false);
    let second = loader.select_by_list(&inputs, false);
    assert_eq!(first.selected, second.selected);
    assert_eq!(first.selected.len(), 2);
}

#[test]
fn test_conditions_drop_templates_with_diagnostics_on_unsupported_fields() {
    let root = TempDir::new().unwrap();
    write_template(root.path(), "a.yaml", "a", &["cve"], "high");
    write_template(root.path(), "b.yaml", "b", &["cve"], "low");

    let criteria = CriteriaConfig::builder()
        .conditions(vec!["severity == high".to_string()])
        .build()
        .unwrap();
    let loader = loader_with(&root, criteria, &PathFilterConfig::default());

    let report = loader.select_by_tags(&[]);
    assert_eq!(names(&report.selected), vec!["a.yaml"]);
    // A false condition is a plain no-match, not a diagnostic
    assert!(report.diagnostics.is_empty());

    let criteria = CriteriaConfig::builder()
        .conditions(vec!["vendor == acme".to_string()])
        .build()
        .unwrap();
    let loader = loader_with(&root, criteria, &PathFilterConfig::default());
    let report = loader.select_by_tags(&[]);
    assert!(report.selected.is_empty());
    assert_eq!(report.diagnostics.len(), 2);
    assert!(report
        .diagnostics
        .iter()
        .all(|d| matches!(d.error, LoadError::Filter(_))));
}

#[test]
fn test_invalid_configuration_refuses_to_start() {
    let result = CriteriaConfig::builder()
        .conditions(vec!["not a condition".to_string()])
        .build();
    assert!(result.is_err());

    let result = CriteriaConfig::builder()
        .severities(vec!["catastrophic".to_string()])
        .build();
    assert!(result.is_err());
}
