//! Markup blocks and the typed values extracted from them

use crate::{Coordinate, PartialDate};
use serde::Serialize;
use std::fmt;

/// One infobox-like template invocation
///
/// Immutable once extracted; the extractor only ever borrows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkupBlock<'a>(&'a str);

impl<'a> MarkupBlock<'a> {
    /// Wrap a span of article text
    pub fn new(text: &'a str) -> Self {
        Self(text)
    }

    /// The raw markup text
    pub fn text(&self) -> &'a str {
        self.0
    }

    /// Whether the block holds no text at all
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl<'a> From<&'a str> for MarkupBlock<'a> {
    fn from(text: &'a str) -> Self {
        Self(text)
    }
}

/// A property name as written in markup, trimmed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PropertyToken(String);

impl PropertyToken {
    /// Create a token from a raw name; surrounding whitespace is removed
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_string())
    }

    /// The trimmed name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A typed candidate value read from a markup block
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ExtractedValue {
    /// A single line of text
    PlainText(String),
    /// Several lines of text (line-break separated in markup), in order
    TextList(Vec<String>),
    /// A date known to year, month or day precision
    Date(PartialDate),
    /// A coordinate with derived precision
    Coordinate(Coordinate),
}

impl ExtractedValue {
    /// Build a text value from extracted lines: one line collapses to
    /// `PlainText`, several stay a `TextList`, none yields `None`
    pub fn from_lines(lines: Vec<String>) -> Option<Self> {
        let mut lines: Vec<String> = lines
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();

        match lines.len() {
            0 => None,
            1 => lines.pop().map(ExtractedValue::PlainText),
            _ => Some(ExtractedValue::TextList(lines)),
        }
    }

    /// Split into single-valued candidates; a `TextList` yields one
    /// `PlainText` per line, anything else yields itself
    pub fn into_scalars(self) -> Vec<ExtractedValue> {
        match self {
            ExtractedValue::TextList(items) => {
                items.into_iter().map(ExtractedValue::PlainText).collect()
            }
            other => vec![other],
        }
    }

    /// The text of a `PlainText` value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ExtractedValue::PlainText(text) => Some(text),
            _ => None,
        }
    }

    /// Short name of the variant, for logs and output
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractedValue::PlainText(_) => "text",
            ExtractedValue::TextList(_) => "list",
            ExtractedValue::Date(_) => "date",
            ExtractedValue::Coordinate(_) => "coordinate",
        }
    }
}

impl fmt::Display for ExtractedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractedValue::PlainText(text) => f.write_str(text),
            ExtractedValue::TextList(items) => f.write_str(&items.join("; ")),
            ExtractedValue::Date(date) => write!(f, "{}", date),
            ExtractedValue::Coordinate(coord) => write!(f, "{}", coord),
        }
    }
}
