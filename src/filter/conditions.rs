//! Condition expressions over template metadata.
//!
//! A condition is a single predicate of the form `field op value`, for
//! example `severity == high`, `tags contains cve`, or `id != 'demo'`.
//! Parsing happens once at configuration build time; evaluation is a pure
//! function of the parsed condition and one template's metadata.

use thiserror::Error;

use crate::metadata::TemplateMetadata;

/// Errors from parsing or evaluating a condition expression
#[derive(Debug, Error)]
pub enum ConditionError {
    /// Expression does not match the `field op value` grammar
    #[error("Malformed condition expression '{0}'")]
    Malformed(String),

    /// Condition referenced a field the metadata does not carry
    #[error("Unsupported field '{0}' in condition")]
    UnsupportedField(String),
}

/// Comparison operator of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Contains,
}

/// A parsed condition expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: String,
    pub op: Op,
    pub value: String,
}

impl TryFrom<&str> for Condition {
    type Error = ConditionError;

    /// Parse a condition string like `severity == high`
    ///
    /// Values may be bare words or single/double-quoted strings.
    ///
    /// # Examples
    /// ```
    /// use templar::filter::conditions::Condition;
    ///
    /// let cond: Condition = "severity == high".try_into().unwrap();
    /// let cond: Condition = "tags contains 'cve'".try_into().unwrap();
    /// ```
    fn try_from(input: &str) -> Result<Self, Self::Error> {
        let malformed = || ConditionError::Malformed(input.to_string());

        let (start, len, op) = find_operator(input).ok_or_else(malformed)?;
        let field = &input[..start];
        let rest = &input[start + len..];

        let field = field.trim();
        if field.is_empty() || !field.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            return Err(malformed());
        }

        let value = unquote(rest.trim()).ok_or_else(malformed)?;
        if value.is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            field: field.to_ascii_lowercase(),
            op,
            value: value.to_ascii_lowercase(),
        })
    }
}

impl Condition {
    /// Evaluate this condition against one template's metadata.
    ///
    /// Comparisons are case-insensitive. For multi-valued fields (`author`,
    /// `tags`), `==` and `contains` hold when any element matches and `!=`
    /// holds when no element equals the value.
    ///
    /// # Errors
    /// Returns `ConditionError::UnsupportedField` when the field is neither
    /// a built-in dimension nor a scalar `info` extra.
    pub fn eval(&self, metadata: &TemplateMetadata) -> Result<bool, ConditionError> {
        let values: Vec<String> = match self.field.as_str() {
            "id" => vec![metadata.id.to_ascii_lowercase()],
            "name" => metadata
                .name
                .iter()
                .map(|n| n.to_ascii_lowercase())
                .collect(),
            "author" | "authors" => {
                metadata.authors.iter().map(|a| a.to_ascii_lowercase()).collect()
            }
            "tags" => metadata.tags.iter().map(|t| t.to_ascii_lowercase()).collect(),
            "severity" => metadata.severity.iter().map(ToString::to_string).collect(),
            "protocol" | "type" => metadata
                .protocol
                .iter()
                .map(|p| p.to_ascii_lowercase())
                .collect(),
            field => {
                let value = metadata
                    .extra
                    .get(field)
                    .ok_or_else(|| ConditionError::UnsupportedField(field.to_string()))?;
                vec![scalar_to_string(value)
                    .ok_or_else(|| ConditionError::UnsupportedField(field.to_string()))?]
            }
        };

        Ok(match self.op {
            Op::Eq => values.iter().any(|v| v == &self.value),
            Op::Ne => !values.iter().any(|v| v == &self.value),
            Op::Contains => values.iter().any(|v| v.contains(&self.value)),
        })
    }
}

/// Locate the first operator outside quoted text, so values like
/// `'a == b'` do not split at the embedded operator.
fn find_operator(input: &str) -> Option<(usize, usize, Op)> {
    let mut quote: Option<char> = None;
    for (i, c) in input.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            _ => {
                let rest = &input[i..];
                if rest.starts_with("==") {
                    return Some((i, 2, Op::Eq));
                }
                if rest.starts_with("!=") {
                    return Some((i, 2, Op::Ne));
                }
                if rest.starts_with(" contains ") {
                    return Some((i, " contains ".len(), Op::Contains));
                }
            }
        }
    }
    None
}

fn unquote(raw: &str) -> Option<&str> {
    if raw.len() >= 2
        && ((raw.starts_with('\'') && raw.ends_with('\''))
            || (raw.starts_with('"') && raw.ends_with('"')))
    {
        return Some(&raw[1..raw.len() - 1]);
    }
    // Bare values must be a single token
    if raw.contains(char::is_whitespace) {
        return None;
    }
    Some(raw)
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.to_ascii_lowercase()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Severity;

    fn sample() -> TemplateMetadata {
        let mut md = TemplateMetadata::with_id("CVE-2021-0001");
        md.authors = vec!["Alice".to_string()];
        md.tags = vec!["cve".to_string(), "rce".to_string()];
        md.severity = Some(Severity::High);
        md.protocol = Some("http".to_string());
        md.extra.insert(
            "verified".to_string(),
            serde_yaml::Value::Bool(true),
        );
        md
    }

    #[test]
    fn test_parse_eq() {
        let cond: Condition = "severity == high".try_into().unwrap();
        assert_eq!(cond.op, Op::Eq);
        assert_eq!(cond.field, "severity");
        assert_eq!(cond.value, "high");
    }

    #[test]
    fn test_parse_quoted_value() {
        let cond: Condition = "name == 'Example check'".try_into().unwrap();
        assert_eq!(cond.value, "example check");
    }

    #[test]
    fn test_parse_contains() {
        let cond: Condition = "id contains cve".try_into().unwrap();
        assert_eq!(cond.op, Op::Contains);
    }

    #[test]
    fn test_parse_quoted_value_with_embedded_operator() {
        let cond: Condition = "name contains 'a == b'".try_into().unwrap();
        assert_eq!(cond.op, Op::Contains);
        assert_eq!(cond.field, "name");
        assert_eq!(cond.value, "a == b");

        let cond: Condition = "name == \"x != y\"".try_into().unwrap();
        assert_eq!(cond.op, Op::Eq);
        assert_eq!(cond.value, "x != y");
    }

    #[test]
    fn test_parse_missing_operator_is_malformed() {
        let result: Result<Condition, _> = "severity high".try_into();
        assert!(matches!(result, Err(ConditionError::Malformed(_))));
    }

    #[test]
    fn test_parse_bare_multiword_value_is_malformed() {
        let result: Result<Condition, _> = "name == Example check".try_into();
        assert!(matches!(result, Err(ConditionError::Malformed(_))));
    }

    #[test]
    fn test_parse_bad_field_is_malformed() {
        let result: Result<Condition, _> = "se verity == high".try_into();
        assert!(matches!(result, Err(ConditionError::Malformed(_))));
    }

    #[test]
    fn test_eval_eq_on_single_field() {
        let cond: Condition = "severity == high".try_into().unwrap();
        assert!(cond.eval(&sample()).unwrap());
        let cond: Condition = "severity == low".try_into().unwrap();
        assert!(!cond.eval(&sample()).unwrap());
    }

    #[test]
    fn test_eval_is_case_insensitive() {
        let cond: Condition = "id == cve-2021-0001".try_into().unwrap();
        assert!(cond.eval(&sample()).unwrap());
        let cond: Condition = "author == ALICE".try_into().unwrap();
        assert!(cond.eval(&sample()).unwrap());
    }

    #[test]
    fn test_eval_eq_on_multi_field_means_any() {
        let cond: Condition = "tags == rce".try_into().unwrap();
        assert!(cond.eval(&sample()).unwrap());
    }

    #[test]
    fn test_eval_ne_on_multi_field_means_none() {
        let cond: Condition = "tags != rce".try_into().unwrap();
        assert!(!cond.eval(&sample()).unwrap());
        let cond: Condition = "tags != wordpress".try_into().unwrap();
        assert!(cond.eval(&sample()).unwrap());
    }

    #[test]
    fn test_eval_contains() {
        let cond: Condition = "id contains 2021".try_into().unwrap();
        assert!(cond.eval(&sample()).unwrap());
    }

    #[test]
    fn test_eval_extra_scalar_field() {
        let cond: Condition = "verified == true".try_into().unwrap();
        assert!(cond.eval(&sample()).unwrap());
    }

    #[test]
    fn test_eval_unknown_field_is_error() {
        let cond: Condition = "vendor == acme".try_into().unwrap();
        let err = cond.eval(&sample()).unwrap_err();
        assert!(matches!(err, ConditionError::UnsupportedField(_)));
    }

    #[test]
    fn test_eval_empty_optional_field() {
        let cond: Condition = "name == anything".try_into().unwrap();
        let md = TemplateMetadata::with_id("bare");
        assert!(!cond.eval(&md).unwrap());
        // != over an empty field holds vacuously
        let cond: Condition = "name != anything".try_into().unwrap();
        assert!(cond.eval(&md).unwrap());
    }
}
