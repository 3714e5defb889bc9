//! Document parser
//!
//! Turns a whole analytics.txt file into a [`Document`]. Input that is clearly
//! a different serialization (JSON) or not text at all is rejected with
//! [`Error::Format`] before any line is interpreted; the first malformed field
//! line stops parsing with [`Error::Parse`].

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::document::Document;
use crate::error::{Error, Result, SyntaxError};
use crate::grammar::{self, Line, COMMENT_PREFIX};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Parse analytics.txt text into a document
pub fn parse_document(text: &str) -> Result<Document> {
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
    sniff_format(text)?;

    let mut document = Document::new();
    let mut declared_on: HashMap<&str, usize> = HashMap::new();

    for (index, raw) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = grammar::parse_line(raw).map_err(|kind| syntax_error(line_number, raw, kind))?;

        let (name, values) = match line {
            Line::Blank | Line::Comment(_) => continue,
            Line::Field { name, values } => (name, values),
        };

        if let Some(&first_line) = declared_on.get(name) {
            return Err(syntax_error(
                line_number,
                raw,
                SyntaxError::DuplicateField {
                    name: name.to_string(),
                    first_line,
                },
            ));
        }
        declared_on.insert(name, line_number);

        trace!(line = line_number, field = name, values = values.len(), "parsed field line");
        document.insert(name.to_string(), values);
    }

    debug!(fields = document.len(), "parsed analytics.txt document");
    Ok(document)
}

/// Reject input that is not line-oriented text in this format
fn sniff_format(text: &str) -> Result<()> {
    if let Some(c) = text
        .chars()
        .find(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
    {
        return Err(Error::Format {
            reason: format!("input contains control character {:?}, which suggests binary data", c),
        });
    }

    let first_significant = text
        .lines()
        .map(str::trim_start)
        .find(|line| !line.is_empty() && !line.starts_with(COMMENT_PREFIX))
        .and_then(|line| line.chars().next());

    if let Some(c @ ('{' | '[')) = first_significant {
        return Err(Error::Format {
            reason: format!("input starts with `{}` and looks like JSON", c),
        });
    }

    Ok(())
}

fn syntax_error(line: usize, raw: &str, kind: SyntaxError) -> Error {
    Error::Parse {
        line,
        content: raw.to_string(),
        kind,
    }
}
