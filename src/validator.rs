//! Validation of documents against a schema draft
//!
//! The schema evaluation itself is done by `jsonschema`; this module shapes
//! its errors into [`Violation`]s and applies the [`ValidationMode`].

use std::fmt;

use jsonschema::error::ValidationErrorKind;
use jsonschema::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::document::Document;
use crate::registry::Draft;

/// Which schema constraints are enforced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Every schema constraint applies
    #[default]
    Strict,
    /// Enumerated-value constraints are relaxed; structure, cardinality,
    /// formats and unknown fields are still checked
    Lax,
}

impl ValidationMode {
    pub fn from_lax(lax: bool) -> Self {
        if lax {
            ValidationMode::Lax
        } else {
            ValidationMode::Strict
        }
    }

    fn enforces(self, kind: &ValidationErrorKind) -> bool {
        match self {
            ValidationMode::Strict => true,
            ValidationMode::Lax => !matches!(kind, ValidationErrorKind::Enum { .. }),
        }
    }
}

/// A single schema violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// JSON pointer to the offending value, e.g. `/Collects/0`
    pub path: String,
    /// Field the violation belongs to, when there is one
    pub field: Option<String>,
    /// Violated schema keyword, e.g. `enum` or `required`
    pub keyword: Option<String>,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}: {}", field, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Outcome of validating one document against one draft. Empty means valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub draft: String,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations attached to the given field
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.violations
            .iter()
            .filter(move |v| v.field.as_deref() == Some(field))
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return write!(f, "Document is valid as per draft {}", self.draft);
        }
        write!(
            f,
            "Document is not valid as per draft {} ({} violation{}):",
            self.draft,
            self.violations.len(),
            if self.violations.len() == 1 { "" } else { "s" }
        )?;
        for violation in &self.violations {
            write!(f, "\n  - {}", violation)?;
        }
        Ok(())
    }
}

/// Validate a parsed document
pub fn validate_document(document: &Document, draft: &Draft, mode: ValidationMode) -> ValidationReport {
    validate_value(&document.to_value(), draft, mode)
}

/// Validate any JSON value shaped like a document
pub fn validate_value(instance: &Value, draft: &Draft, mode: ValidationMode) -> ValidationReport {
    let mut violations = Vec::new();

    if let Err(errors) = draft.compiled().validate(instance) {
        for error in errors {
            if !mode.enforces(&error.kind) {
                trace!(path = %error.instance_path, "relaxed enum violation");
                continue;
            }
            collect_violations(&error, &mut violations);
        }
    }

    for violation in &violations {
        trace!(draft = draft.id(), path = %violation.path, "{}", violation.message);
    }

    ValidationReport {
        draft: draft.id().to_string(),
        violations,
    }
}

fn collect_violations(error: &ValidationError<'_>, out: &mut Vec<Violation>) {
    let path = error.instance_path.to_string();
    let keyword = error
        .schema_path
        .to_string()
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(String::from);

    match &error.kind {
        ValidationErrorKind::AdditionalProperties { unexpected } => {
            for name in unexpected {
                out.push(Violation {
                    path: format!("{}/{}", path, name),
                    field: Some(name.clone()),
                    keyword: keyword.clone(),
                    message: format!("unknown field `{}`", name),
                });
            }
        }
        ValidationErrorKind::Required { property } => {
            let name = property.as_str().map(String::from);
            out.push(Violation {
                message: match &name {
                    Some(name) => format!("required field `{}` is missing", name),
                    None => error.to_string(),
                },
                path,
                field: name,
                keyword,
            });
        }
        _ => out.push(Violation {
            field: field_of(&path),
            path,
            keyword,
            message: error.to_string(),
        }),
    }
}

/// First segment of a JSON pointer, which names the field
fn field_of(pointer: &str) -> Option<String> {
    pointer
        .strip_prefix('/')
        .and_then(|rest| rest.split('/').next())
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft() -> Draft {
        Draft::from_json(
            "test",
            json!({
                "type": "object",
                "required": ["Author"],
                "additionalProperties": false,
                "properties": {
                    "Author": {
                        "type": "array",
                        "minItems": 1,
                        "items": { "type": "string", "minLength": 1 }
                    },
                    "Collects": {
                        "type": "array",
                        "minItems": 1,
                        "items": { "type": "string", "enum": ["none", "url"] }
                    }
                }
            }),
        )
        .unwrap()
    }

    fn doc(fields: &[(&str, Vec<&str>)]) -> Document {
        fields.iter().map(|(name, values)| (*name, values.clone())).collect()
    }

    #[test]
    fn test_valid_document() {
        let report = validate_document(
            &doc(&[("Author", vec!["A"]), ("Collects", vec!["url"])]),
            &draft(),
            ValidationMode::Strict,
        );
        assert!(report.is_valid(), "{}", report);
        assert_eq!(report.draft, "test");
    }

    #[test]
    fn test_enum_violation_strict() {
        let report = validate_document(
            &doc(&[("Author", vec!["A"]), ("Collects", vec!["url", "ducklings"])]),
            &draft(),
            ValidationMode::Strict,
        );
        assert_eq!(report.violations.len(), 1);
        let violation = &report.violations[0];
        assert_eq!(violation.path, "/Collects/1");
        assert_eq!(violation.field.as_deref(), Some("Collects"));
        assert_eq!(violation.keyword.as_deref(), Some("enum"));
    }

    #[test]
    fn test_enum_violation_relaxed_in_lax_mode() {
        let report = validate_document(
            &doc(&[("Author", vec!["A"]), ("Collects", vec!["ducklings"])]),
            &draft(),
            ValidationMode::Lax,
        );
        assert!(report.is_valid(), "{}", report);
    }

    #[test]
    fn test_lax_mode_keeps_structural_checks() {
        let report = validate_document(
            &doc(&[("Collects", vec![]), ("Tracks", vec!["users"])]),
            &draft(),
            ValidationMode::Lax,
        );
        let keywords: Vec<_> = report
            .violations
            .iter()
            .map(|v| v.keyword.as_deref().unwrap_or_default())
            .collect();
        assert!(keywords.contains(&"required"), "{:?}", keywords);
        assert!(keywords.contains(&"minItems"), "{:?}", keywords);
        assert!(keywords.contains(&"additionalProperties"), "{:?}", keywords);
    }

    #[test]
    fn test_one_violation_per_unknown_field() {
        let report = validate_document(
            &doc(&[("Author", vec!["A"]), ("Foo", vec!["x"]), ("Bar", vec!["y"])]),
            &draft(),
            ValidationMode::Strict,
        );
        let fields: Vec<_> = report.violations.iter().filter_map(|v| v.field.as_deref()).collect();
        assert_eq!(report.violations.len(), 2);
        assert!(fields.contains(&"Foo"));
        assert!(fields.contains(&"Bar"));
    }

    #[test]
    fn test_missing_required_field() {
        let report = validate_document(&doc(&[("Collects", vec!["none"])]), &draft(), ValidationMode::Strict);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].field.as_deref(), Some("Author"));
        assert_eq!(report.violations[0].keyword.as_deref(), Some("required"));
    }

    #[test]
    fn test_aggregates_all_violations() {
        let report = validate_document(
            &doc(&[("Author", vec![""]), ("Collects", vec!["a", "b"])]),
            &draft(),
            ValidationMode::Strict,
        );
        assert_eq!(report.violations.len(), 3, "{}", report);
        assert_eq!(report.for_field("Collects").count(), 2);
    }

    #[test]
    fn test_wrong_value_shape() {
        let report = validate_value(&json!({ "Author": "A" }), &draft(), ValidationMode::Lax);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].keyword.as_deref(), Some("type"));
    }

    #[test]
    fn test_does_not_mutate_input() {
        let document = doc(&[("Author", vec!["A"]), ("Collects", vec!["ducklings"])]);
        let before = document.clone();
        let _ = validate_document(&document, &draft(), ValidationMode::Strict);
        assert_eq!(document, before);
    }

    #[test]
    fn test_report_display() {
        let report = validate_document(
            &doc(&[("Author", vec!["A"]), ("Collects", vec!["ducklings"])]),
            &draft(),
            ValidationMode::Strict,
        );
        let text = report.to_string();
        assert!(text.contains("draft test"));
        assert!(text.contains("1 violation)"));
        assert!(text.contains("Collects:"));
    }

    #[test]
    fn test_field_of_pointer() {
        assert_eq!(field_of("/Collects/0").as_deref(), Some("Collects"));
        assert_eq!(field_of("/a~1b").as_deref(), Some("a/b"));
        assert_eq!(field_of(""), None);
    }
}
