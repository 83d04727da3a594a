//! Template metadata model and lazy parse.
//!
//! Only the filtering-relevant subset of a template file is parsed here:
//! the identifier, the `info` block (name, authors, tags, severity), and
//! the protocol inferred from the first recognized protocol section. The
//! template body is never interpreted.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Protocol sections recognized at the template top level, paired with the
/// protocol name they imply. `requests` is the legacy spelling of `http`.
const PROTOCOL_SECTIONS: [(&str, &str); 12] = [
    ("requests", "http"),
    ("http", "http"),
    ("dns", "dns"),
    ("file", "file"),
    ("network", "network"),
    ("tcp", "network"),
    ("headless", "headless"),
    ("ssl", "ssl"),
    ("websocket", "websocket"),
    ("whois", "whois"),
    ("code", "code"),
    ("javascript", "javascript"),
];

/// Errors that can occur while parsing template metadata
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Template file could not be read
    #[error("Could not read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template file is not valid YAML
    #[error("Could not parse '{path}': {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Template has no identifier
    #[error("Template '{0}' has no id field")]
    MissingId(PathBuf),
}

/// Severity declared by a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
    Unknown,
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!("Unrecognized severity '{other}'")),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Info => "info",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
            Self::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

/// The filtering-relevant subset of a template's declared fields
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateMetadata {
    /// Template identifier (required)
    pub id: String,
    /// Human-readable name, if declared
    pub name: Option<String>,
    /// Declared authors; empty when the template declares none
    pub authors: Vec<String>,
    /// Declared tags; empty when the template declares none
    pub tags: Vec<String>,
    /// Declared severity, if any
    pub severity: Option<Severity>,
    /// Protocol implied by the first recognized protocol section
    pub protocol: Option<String>,
    /// Remaining scalar `info` fields, available to condition expressions
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl TemplateMetadata {
    /// Minimal metadata carrying only an identifier
    #[must_use]
    pub fn with_id(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: None,
            authors: Vec::new(),
            tags: Vec::new(),
            severity: None,
            protocol: None,
            extra: BTreeMap::new(),
        }
    }
}

/// Wire shape of a template file; everything outside `id` and `info` is
/// kept only long enough to infer the protocol.
#[derive(Debug, Deserialize)]
struct RawTemplate {
    id: Option<String>,
    #[serde(default)]
    info: RawInfo,
    #[serde(flatten)]
    sections: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawInfo {
    name: Option<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    author: Vec<String>,
    severity: Option<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    tags: Vec<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_yaml::Value>,
}

/// Accept either a YAML list or a comma-separated string; both forms
/// appear in real template corpora.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        One(String),
        Many(Vec<String>),
    }

    let values = match StringOrList::deserialize(deserializer)? {
        StringOrList::One(s) => s.split(',').map(str::to_string).collect(),
        StringOrList::Many(list) => list,
    };
    Ok(values
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

/// Parse the filtering-relevant metadata of a single template file.
///
/// Invoked once per surviving candidate; results are never cached across
/// runs.
///
/// # Errors
/// * Returns `MetadataError::Io` if the file cannot be read.
/// * Returns `MetadataError::Yaml` if the file is not valid YAML.
/// * Returns `MetadataError::MissingId` if no identifier is declared.
pub fn parse_metadata(path: &Path) -> Result<TemplateMetadata, MetadataError> {
    let text = std::fs::read_to_string(path).map_err(|source| MetadataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: RawTemplate = serde_yaml::from_str(&text).map_err(|source| MetadataError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;

    let id = raw
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| MetadataError::MissingId(path.to_path_buf()))?;

    // Severity strings in the wild are lenient; anything unrecognized is
    // treated as unknown rather than failing the whole template.
    let severity = raw
        .info
        .severity
        .map(|s| Severity::from_str(&s).unwrap_or(Severity::Unknown));

    let protocol = PROTOCOL_SECTIONS
        .iter()
        .find(|(section, _)| raw.sections.contains_key(*section))
        .map(|(_, protocol)| (*protocol).to_string());

    Ok(TemplateMetadata {
        id,
        name: raw.info.name,
        authors: raw.info.author,
        tags: raw.info.tags,
        severity,
        protocol,
        extra: raw.info.extra,
    })
}
