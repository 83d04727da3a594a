//! Metadata criteria configuration and the tag filter.
//!
//! `CriteriaConfig` holds the include/exclude sets for every filter
//! dimension plus the parsed condition expressions; it is built once per
//! run and read-only thereafter. `TagFilter` applies the configuration to
//! one template's metadata with a fixed precedence: exclusions are always
//! authoritative, and identifier allow-listing is stricter than tag
//! allow-listing.

use std::collections::BTreeSet;
use std::str::FromStr;

use super::conditions::Condition;
use super::error::FilterError;
use crate::metadata::{Severity, TemplateMetadata};

/// Immutable criteria configuration for one run
#[derive(Debug, Default, Clone)]
pub struct CriteriaConfig {
    pub(crate) authors: BTreeSet<String>,
    pub(crate) exclude_authors: BTreeSet<String>,
    pub(crate) tags: BTreeSet<String>,
    pub(crate) exclude_tags: BTreeSet<String>,
    pub(crate) include_tags: BTreeSet<String>,
    pub(crate) ids: BTreeSet<String>,
    pub(crate) exclude_ids: BTreeSet<String>,
    pub(crate) protocols: BTreeSet<String>,
    pub(crate) exclude_protocols: BTreeSet<String>,
    pub(crate) severities: BTreeSet<Severity>,
    pub(crate) exclude_severities: BTreeSet<Severity>,
    pub(crate) conditions: Vec<Condition>,
}

impl CriteriaConfig {
    /// Create a new criteria configuration builder
    #[must_use]
    pub fn builder() -> CriteriaConfigBuilder {
        CriteriaConfigBuilder::default()
    }
}

/// Builder for `CriteriaConfig`
///
/// `build()` is the single construction-time failure point: severity and
/// condition strings are parsed there, and an invalid entry refuses the
/// whole configuration.
#[derive(Debug, Clone, Default)]
pub struct CriteriaConfigBuilder {
    authors: Vec<String>,
    exclude_authors: Vec<String>,
    tags: Vec<String>,
    exclude_tags: Vec<String>,
    include_tags: Vec<String>,
    ids: Vec<String>,
    exclude_ids: Vec<String>,
    protocols: Vec<String>,
    exclude_protocols: Vec<String>,
    severities: Vec<String>,
    exclude_severities: Vec<String>,
    conditions: Vec<String>,
}

impl CriteriaConfigBuilder {
    /// Authors to include
    #[must_use]
    pub fn authors(mut self, authors: Vec<String>) -> Self {
        self.authors = authors;
        self
    }

    /// Authors to exclude
    #[must_use]
    pub fn exclude_authors(mut self, authors: Vec<String>) -> Self {
        self.exclude_authors = authors;
        self
    }

    /// Tags to include
    #[must_use]
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Tags to exclude
    #[must_use]
    pub fn exclude_tags(mut self, tags: Vec<String>) -> Self {
        self.exclude_tags = tags;
        self
    }

    /// Tags allowed through even when the exclude-tag set would suppress
    /// them; the one carve-out from exclude-wins precedence
    #[must_use]
    pub fn include_tags(mut self, tags: Vec<String>) -> Self {
        self.include_tags = tags;
        self
    }

    /// Identifiers to include; when non-empty this is an exhaustive
    /// allow-list
    #[must_use]
    pub fn ids(mut self, ids: Vec<String>) -> Self {
        self.ids = ids;
        self
    }

    /// Identifiers to exclude
    #[must_use]
    pub fn exclude_ids(mut self, ids: Vec<String>) -> Self {
        self.exclude_ids = ids;
        self
    }

    /// Protocols to include
    #[must_use]
    pub fn protocols(mut self, protocols: Vec<String>) -> Self {
        self.protocols = protocols;
        self
    }

    /// Protocols to exclude
    #[must_use]
    pub fn exclude_protocols(mut self, protocols: Vec<String>) -> Self {
        self.exclude_protocols = protocols;
        self
    }

    /// Severities to include
    #[must_use]
    pub fn severities(mut self, severities: Vec<String>) -> Self {
        self.severities = severities;
        self
    }

    /// Severities to exclude
    #[must_use]
    pub fn exclude_severities(mut self, severities: Vec<String>) -> Self {
        self.exclude_severities = severities;
        self
    }

    /// Condition expressions, e.g. `severity == high`
    #[must_use]
    pub fn conditions(mut self, conditions: Vec<String>) -> Self {
        self.conditions = conditions;
        self
    }

    /// Build the `CriteriaConfig`
    ///
    /// # Errors
    /// * Returns `FilterError::InvalidSeverity` for an unrecognized
    ///   severity string.
    /// * Returns `FilterError::Condition` for a malformed condition
    ///   expression.
    pub fn build(self) -> Result<CriteriaConfig, FilterError> {
        let conditions = self
            .conditions
            .iter()
            .map(|c| Condition::try_from(c.as_str()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CriteriaConfig {
            authors: normalize(self.authors),
            exclude_authors: normalize(self.exclude_authors),
            tags: normalize(self.tags),
            exclude_tags: normalize(self.exclude_tags),
            include_tags: normalize(self.include_tags),
            ids: normalize(self.ids),
            exclude_ids: normalize(self.exclude_ids),
            protocols: normalize(self.protocols),
            exclude_protocols: normalize(self.exclude_protocols),
            severities: parse_severities(self.severities)?,
            exclude_severities: parse_severities(self.exclude_severities)?,
            conditions,
        })
    }
}

fn normalize(values: Vec<String>) -> BTreeSet<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

fn parse_severities(values: Vec<String>) -> Result<BTreeSet<Severity>, FilterError> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(|v| Severity::from_str(&v).map_err(|_| FilterError::InvalidSeverity(v)))
        .collect()
}

/// Decides whether one template's metadata is selected under a criteria
/// configuration, optionally narrowed by call-time ad-hoc tags.
#[derive(Debug, Clone)]
pub struct TagFilter {
    config: CriteriaConfig,
}

impl TagFilter {
    #[must_use]
    pub const fn new(config: CriteriaConfig) -> Self {
        Self { config }
    }

    /// Decide whether a template matches.
    ///
    /// Evaluation order, first applicable rule wins:
    /// 1. excluded identifier → no match
    /// 2. identifier absent from a non-empty include-id set → no match
    /// 3. configured conditions must all hold; an evaluation failure is an
    ///    error, never a silent no-match
    /// 4. any value in a dimension exclude set → no match
    /// 5. non-empty `ad_hoc_tags` must share a tag with the template
    /// 6. when any include dimension is configured, at least one must be
    ///    satisfied
    /// 7. otherwise → match
    ///
    /// # Errors
    /// Returns `FilterError::Condition` when a condition expression
    /// references a field this template's metadata cannot answer.
    pub fn matches(
        &self,
        metadata: &TemplateMetadata,
        ad_hoc_tags: &[String],
    ) -> Result<bool, FilterError> {
        let config = &self.config;
        let id = metadata.id.to_ascii_lowercase();

        if config.exclude_ids.contains(&id) {
            return Ok(false);
        }
        if !config.ids.is_empty() && !config.ids.contains(&id) {
            return Ok(false);
        }

        for condition in &config.conditions {
            if !condition.eval(metadata)? {
                return Ok(false);
            }
        }

        let authors: Vec<String> = metadata
            .authors
            .iter()
            .map(|a| a.to_ascii_lowercase())
            .collect();
        let tags: Vec<String> = metadata.tags.iter().map(|t| t.to_ascii_lowercase()).collect();
        let protocol = metadata.protocol.as_ref().map(|p| p.to_ascii_lowercase());

        if authors.iter().any(|a| config.exclude_authors.contains(a)) {
            return Ok(false);
        }
        // An excluded tag suppresses the template unless the same tag is
        // explicitly re-allowed via the include-tags carve-out.
        if tags
            .iter()
            .any(|t| config.exclude_tags.contains(t) && !config.include_tags.contains(t))
        {
            return Ok(false);
        }
        if let Some(severity) = metadata.severity
            && config.exclude_severities.contains(&severity)
        {
            return Ok(false);
        }
        if let Some(protocol) = &protocol
            && config.exclude_protocols.contains(protocol)
        {
            return Ok(false);
        }

        if !ad_hoc_tags.is_empty() {
            let wanted: BTreeSet<String> = ad_hoc_tags
                .iter()
                .map(|t| t.trim().to_ascii_lowercase())
                .collect();
            if !tags.iter().any(|t| wanted.contains(t)) {
                return Ok(false);
            }
        }

        let mut any_configured = false;
        let mut any_satisfied = false;
        let mut check = |configured: bool, satisfied: bool| {
            if configured {
                any_configured = true;
                any_satisfied |= satisfied;
            }
        };
        check(
            !config.authors.is_empty(),
            authors.iter().any(|a| config.authors.contains(a)),
        );
        check(
            !config.tags.is_empty(),
            tags.iter().any(|t| config.tags.contains(t)),
        );
        check(
            !config.severities.is_empty(),
            metadata
                .severity
                .is_some_and(|s| config.severities.contains(&s)),
        );
        check(
            !config.protocols.is_empty(),
            protocol.as_ref().is_some_and(|p| config.protocols.contains(p)),
        );
        if any_configured && !any_satisfied {
            return Ok(false);
        }

        Ok(true)
    }
}
