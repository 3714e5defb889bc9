//! Error types for analytics.txt processing

use thiserror::Error;

use crate::validator::ValidationReport;

/// Result type for analytics.txt operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by parsing, validation and serialization
#[derive(Error, Debug)]
pub enum Error {
    /// The input is not an analytics.txt document at all (JSON, binary data)
    #[error("Input is not in analytics.txt format: {reason}")]
    Format { reason: String },

    #[error("Syntax error on line {line}: {kind}\n  {line} | {content}")]
    Parse {
        line: usize,
        content: String,
        kind: SyntaxError,
    },

    #[error("Unknown draft `{name}`{}. Known drafts: {}", did_you_mean(.suggestion), .known.join(", "))]
    UnknownDraft {
        name: String,
        known: Vec<String>,
        suggestion: Option<String>,
    },

    #[error("{0}")]
    Validation(ValidationReport),

    #[error("Schema for draft {draft} is invalid: {reason}")]
    InvalidSchema { draft: String, reason: String },

    #[error("Invalid draft registry: {0}")]
    Registry(String),

    /// A valid document holds a value the line format cannot carry
    #[error("Field `{field}` cannot be written as analytics.txt: {reason}")]
    Unrepresentable { field: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// The validation report, if this error was raised by the validator
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            Error::Validation(report) => Some(report),
            _ => None,
        }
    }
}

/// Reasons a single line fails the field grammar
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("expected `Field: value`, found no `:` separator")]
    MissingSeparator,

    #[error("missing field name before `:`")]
    MissingFieldName,

    #[error("invalid field name `{0}` (letters, digits, `-` and `_` only, starting with a letter)")]
    InvalidFieldName(String),

    #[error("field `{name}` is already declared on line {first_line}")]
    DuplicateField { name: String, first_line: usize },
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean `{}`?)", s),
        None => String::new(),
    }
}
