//! Serialization of documents into canonical analytics.txt text

use serde::Serialize;
use tracing::debug;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::grammar::{format_line, unrepresentable_reason};
use crate::registry::Draft;
use crate::validator::{validate_value, ValidationMode};

/// Validate `input` against `draft` and render it as analytics.txt text.
///
/// Nothing is rendered when validation fails under `mode`, or when a value
/// would not parse back unchanged (embedded `,` or line breaks, surrounding
/// whitespace, empty value lists). Fields are
/// written in the draft's canonical order; fields the draft does not know
/// (only reachable with permissive schemas) follow in input order.
pub fn serialize_with<T>(input: &T, draft: &Draft, mode: ValidationMode) -> Result<String>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(input)?;

    let report = validate_value(&value, draft, mode);
    if !report.is_valid() {
        debug!(draft = draft.id(), violations = report.violations.len(), "refusing to serialize");
        return Err(Error::Validation(report));
    }

    let document: Document = serde_json::from_value(value)?;
    ensure_representable(&document)?;
    let text = render(&document, draft.field_order());

    debug!(draft = draft.id(), fields = document.len(), "serialized analytics.txt document");
    Ok(text)
}

fn ensure_representable(document: &Document) -> Result<()> {
    for (field, values) in document {
        if let Some(reason) = unrepresentable_reason(values) {
            debug!(field = %field, "refusing to serialize unrepresentable value");
            return Err(Error::Unrepresentable {
                field: field.clone(),
                reason,
            });
        }
    }
    Ok(())
}

/// Render a document with the given field order, without validation
pub fn render(document: &Document, field_order: &[String]) -> String {
    let known = field_order
        .iter()
        .filter_map(|name| document.get(name).map(|values| (name.as_str(), values)));
    let extra = document
        .iter()
        .filter(|(name, _)| !field_order.contains(*name))
        .map(|(name, values)| (name.as_str(), values.as_slice()));

    known
        .chain(extra)
        .map(|(name, values)| format_line(name, values))
        .collect::<Vec<_>>()
        .join("\n")
}
