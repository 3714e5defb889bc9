//! Line grammar
//!
//! A field line has the shape `<Name>:<ws>*<value>(,<ws>*<value>)*`. Blank
//! lines and lines whose first non-whitespace character is `#` carry no data.
//! Formatting is the inverse: name, `": "`, values joined with `", "`.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::SyntaxError;

/// Character that starts a comment line
pub const COMMENT_PREFIX: char = '#';

const SEPARATOR: char = ':';
const VALUE_DELIMITER: char = ',';

/// A classified input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    Blank,
    Comment(&'a str),
    Field { name: &'a str, values: Vec<String> },
}

fn field_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").unwrap())
}

/// Check whether `name` is a legal field name
pub fn is_valid_field_name(name: &str) -> bool {
    field_name_pattern().is_match(name)
}

/// Classify and parse a single raw line (without its line terminator)
pub fn parse_line(raw: &str) -> Result<Line<'_>, SyntaxError> {
    let line = raw.trim();
    if line.is_empty() {
        return Ok(Line::Blank);
    }
    if let Some(comment) = line.strip_prefix(COMMENT_PREFIX) {
        return Ok(Line::Comment(comment.trim_start()));
    }

    let (name, rest) = line
        .split_once(SEPARATOR)
        .ok_or(SyntaxError::MissingSeparator)?;

    if name.is_empty() {
        return Err(SyntaxError::MissingFieldName);
    }
    if !is_valid_field_name(name) {
        return Err(SyntaxError::InvalidFieldName(name.to_string()));
    }

    let values = rest
        .split(VALUE_DELIMITER)
        .map(|value| value.trim().to_string())
        .collect();

    Ok(Line::Field { name, values })
}

/// Why a value list would not parse back unchanged, if it would not
pub fn unrepresentable_reason(values: &[String]) -> Option<String> {
    if values.is_empty() {
        return Some("the value list is empty".to_string());
    }
    for value in values {
        if value.contains(VALUE_DELIMITER) {
            return Some(format!("value {:?} contains `{}`", value, VALUE_DELIMITER));
        }
        if value.contains(['\n', '\r']) {
            return Some(format!("value {:?} contains a line break", value));
        }
        if value.trim() != value {
            return Some(format!("value {:?} has leading or trailing whitespace", value));
        }
    }
    None
}

/// Format a field line. An empty value list renders as `Name:`.
pub fn format_line(name: &str, values: &[String]) -> String {
    if values.is_empty() {
        return format!("{}{}", name, SEPARATOR);
    }
    format!("{}{} {}", name, SEPARATOR, values.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(raw: &str) -> (String, Vec<String>) {
        match parse_line(raw).unwrap() {
            Line::Field { name, values } => (name.to_string(), values),
            other => panic!("Expected field line, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_simple_field() {
        let (name, values) = field("Collects: url, referrer, device-type");
        assert_eq!(name, "Collects");
        assert_eq!(values, vec!["url", "referrer", "device-type"]);
    }

    #[test]
    fn test_values_are_trimmed() {
        let (_, values) = field("  Stores:first-party-cookies ,   local-storage  ");
        assert_eq!(values, vec!["first-party-cookies", "local-storage"]);
    }

    #[test]
    fn test_value_keeps_inner_whitespace_and_colons() {
        let (name, values) = field("Author: Frederik Ring <hioffen@posteo.de>, https://example.com");
        assert_eq!(name, "Author");
        assert_eq!(values, vec!["Frederik Ring <hioffen@posteo.de>", "https://example.com"]);
    }

    #[test]
    fn test_empty_values_pass_through() {
        let (_, values) = field("Collects: url,");
        assert_eq!(values, vec!["url", ""]);

        let (_, values) = field("Author:");
        assert_eq!(values, vec![""]);
    }

    #[test]
    fn test_none_is_not_special() {
        let (_, values) = field("Honors: none");
        assert_eq!(values, vec!["none"]);
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(parse_line("").unwrap(), Line::Blank);
        assert_eq!(parse_line("   \t").unwrap(), Line::Blank);
        assert_eq!(
            parse_line("  # Data is retained for 6 months").unwrap(),
            Line::Comment("Data is retained for 6 months")
        );
        // Colons inside comments are not field separators
        assert_eq!(parse_line("#Author: nobody").unwrap(), Line::Comment("Author: nobody"));
    }

    #[test]
    fn test_missing_separator() {
        assert_eq!(parse_line("Author Frederik"), Err(SyntaxError::MissingSeparator));
    }

    #[test]
    fn test_missing_field_name() {
        assert_eq!(parse_line(": url"), Err(SyntaxError::MissingFieldName));
    }

    #[test]
    fn test_invalid_field_names() {
        assert_eq!(
            parse_line("Author : x"),
            Err(SyntaxError::InvalidFieldName("Author ".to_string()))
        );
        assert_eq!(
            parse_line("\"json\": \"is cool\""),
            Err(SyntaxError::InvalidFieldName("\"json\"".to_string()))
        );
        assert_eq!(
            parse_line("1st: x"),
            Err(SyntaxError::InvalidFieldName("1st".to_string()))
        );
    }

    #[test]
    fn test_format_line() {
        let values = vec!["url".to_string(), "referrer".to_string()];
        assert_eq!(format_line("Collects", &values), "Collects: url, referrer");
        assert_eq!(format_line("Author", &[]), "Author:");
    }

    #[test]
    fn test_unrepresentable_values() {
        let values = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        assert_eq!(unrepresentable_reason(&values(&["url", "none"])), None);
        assert_eq!(unrepresentable_reason(&values(&["Frederik Ring <hioffen@posteo.de>"])), None);

        assert!(unrepresentable_reason(&[]).is_some());
        assert!(unrepresentable_reason(&values(&["Ring, Frederik"])).is_some());
        assert!(unrepresentable_reason(&values(&["A\nShares: third-parties"])).is_some());
        assert!(unrepresentable_reason(&values(&["A\r"])).is_some());
        assert!(unrepresentable_reason(&values(&[" A "])).is_some());
        assert!(unrepresentable_reason(&values(&["A", ""])).is_none());
    }

    #[test]
    fn test_format_then_parse_is_identity() {
        let values = vec!["opt-in".to_string(), "opt-out".to_string()];
        let line = format_line("Allows", &values);
        assert_eq!(field(&line), ("Allows".to_string(), values));
    }
}
