//! analytics.txt
//!
//! Parse, validate and serialize analytics.txt files: plain-text documents of
//! `Field: value, value` lines describing how a website collects usage data.
//!
//! ## Features
//!
//! - **Versioned Drafts**: documents are validated against named schema drafts
//!   bundled with the crate; one of them is the default
//! - **Lax Mode**: unknown values for known fields can be tolerated while the
//!   document structure is still enforced
//! - **Canonical Output**: serialization orders fields as the draft lists them,
//!   so equivalent inputs produce identical text
//!
//! ## Example
//!
//! ```
//! use analyticstxt::{parse, Options};
//!
//! let parsed = parse("Author: A\nCollects: url, referrer\n", &Options::new()).unwrap();
//! assert!(parsed.is_valid());
//! assert_eq!(parsed.document.get("Collects").unwrap(), ["url", "referrer"]);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! text ──▶ parser (grammar per line) ──▶ Document ──▶ validator ──▶ ValidationReport
//!                                                        ▲
//! JSON-shaped value ──▶ validator ──▶ ser (grammar) ──▶ text
//!                                                        │
//!                        registry: draft id ──▶ compiled schema
//! ```

pub mod checksum;
pub mod config;
pub mod document;
pub mod error;
pub mod grammar;
pub mod parser;
pub mod registry;
pub mod ser;
pub mod validator;

use serde::Serialize;
use tracing::debug;

pub use checksum::Checksum;
pub use config::Settings;
pub use document::Document;
pub use error::{Error, Result, SyntaxError};
pub use parser::parse_document;
pub use registry::{Draft, DraftInfo, DraftRegistry};
pub use validator::{ValidationMode, ValidationReport, Violation};

/// Draft selection and validation mode for a single call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Draft to validate against; the registry default when unset
    pub draft: Option<String>,
    pub mode: ValidationMode,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(mut self, name: impl Into<String>) -> Self {
        self.draft = Some(name.into());
        self
    }

    pub fn lax(mut self, lax: bool) -> Self {
        self.mode = ValidationMode::from_lax(lax);
        self
    }

    pub fn mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }
}

/// A parsed document together with its validation report.
///
/// Schema violations do not hide the parsed value; callers decide what to do
/// with a document that parsed but does not conform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub document: Document,
    pub report: ValidationReport,
}

impl Parsed {
    pub fn is_valid(&self) -> bool {
        self.report.is_valid()
    }

    /// The document if it conforms, otherwise the validation error
    pub fn into_result(self) -> Result<Document> {
        if self.report.is_valid() {
            Ok(self.document)
        } else {
            Err(Error::Validation(self.report))
        }
    }
}

/// Operations bound to a specific draft registry
#[derive(Debug, Clone, Copy)]
pub struct Engine<'r> {
    registry: &'r DraftRegistry,
}

impl<'r> Engine<'r> {
    pub fn new(registry: &'r DraftRegistry) -> Self {
        Self { registry }
    }

    /// Engine over the drafts bundled with this crate
    pub fn bundled() -> Result<Engine<'static>> {
        DraftRegistry::bundled().map(Engine::new)
    }

    pub fn registry(&self) -> &'r DraftRegistry {
        self.registry
    }

    /// Parse text and validate the resulting document
    pub fn parse(&self, text: &str, options: &Options) -> Result<Parsed> {
        let draft = self.registry.resolve(options.draft.as_deref())?;
        let document = parse_document(text)?;
        let report = validator::validate_document(&document, draft, options.mode);
        debug!(draft = draft.id(), valid = report.is_valid(), "parsed");
        Ok(Parsed { document, report })
    }

    /// Check that text is a conforming analytics.txt document
    pub fn validate(&self, text: &str, options: &Options) -> Result<()> {
        self.parse(text, options)?.into_result().map(drop)
    }

    /// Validate a JSON-shaped value and render it as analytics.txt text
    pub fn serialize<T>(&self, input: &T, options: &Options) -> Result<String>
    where
        T: Serialize + ?Sized,
    {
        let draft = self.registry.resolve(options.draft.as_deref())?;
        ser::serialize_with(input, draft, options.mode)
    }

    pub fn default_version(&self) -> &'r str {
        self.registry.default_id()
    }

    pub fn list_drafts(&self) -> Vec<DraftInfo> {
        self.registry.list_drafts()
    }
}

/// Validate text against the bundled drafts
pub fn validate(text: &str, options: &Options) -> Result<()> {
    Engine::bundled()?.validate(text, options)
}

/// Parse text and validate it against the bundled drafts
pub fn parse(text: &str, options: &Options) -> Result<Parsed> {
    Engine::bundled()?.parse(text, options)
}

/// Serialize a JSON-shaped value using the bundled drafts
pub fn serialize<T>(input: &T, options: &Options) -> Result<String>
where
    T: Serialize + ?Sized,
{
    Engine::bundled()?.serialize(input, options)
}

/// Identifier of the default bundled draft
pub fn default_version() -> Result<&'static str> {
    Ok(Engine::bundled()?.default_version())
}

/// All bundled drafts, sorted, with the default marked
pub fn list_drafts() -> Result<Vec<DraftInfo>> {
    Ok(Engine::bundled()?.list_drafts())
}
