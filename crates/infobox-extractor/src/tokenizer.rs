//! Markup tokenizer: finds the field names a block defines

use crate::config::TokenizerOptions;
use infobox_domain::{MarkupBlock, PropertyToken};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// `|name=` with a name of three or more letters/underscores
static FIELD_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\|\s*([\p{L}_]{3,})\s*=").expect("field name pattern is valid")
});

/// Like [`FIELD_NAME`] but names may contain inner spaces (`| Ship builder =`)
static SPACED_FIELD_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\|\s*([\p{L}_][\p{L}_ \t]*[\p{L}_])\s*=").expect("spaced field name pattern is valid")
});

/// Scans markup blocks for field names
#[derive(Debug, Clone, Copy, Default)]
pub struct Tokenizer {
    options: TokenizerOptions,
}

impl Tokenizer {
    /// Create a tokenizer with the given options
    pub fn new(options: TokenizerOptions) -> Self {
        Self { options }
    }

    /// Field names defined in `block`, in first-seen order, without duplicates
    ///
    /// An empty result means the block defines no fields; it is not an error.
    pub fn tokenize(&self, block: MarkupBlock<'_>) -> Vec<PropertyToken> {
        let pattern = if self.options.spaced_names {
            &*SPACED_FIELD_NAME
        } else {
            &*FIELD_NAME
        };

        let mut seen = HashSet::new();
        let mut tokens = Vec::new();
        let text = block.text();
        for caps in pattern.captures_iter(text) {
            let Some(field) = caps.get(0) else {
                continue;
            };
            if !at_field_level(text, field.start()) {
                continue;
            }
            let token = PropertyToken::new(&caps[1]);
            if token.as_str().chars().filter(|c| !c.is_whitespace()).count() < 3 {
                continue;
            }
            if seen.insert(token.clone()) {
                tokens.push(token);
            }
        }
        tokens
    }
}

/// Whether byte offset `at` of `text` is outside every nested template and link
///
/// When `text` opens with `{{`, that template is the infobox itself and its
/// own fields count as field level.
pub(crate) fn at_field_level(text: &str, at: usize) -> bool {
    let outer = usize::from(text.trim_start().starts_with("{{"));
    let bytes = text.as_bytes();
    let end = at.min(bytes.len());
    let mut templates = 0usize;
    let mut links = 0usize;
    let mut i = 0;

    while i < end {
        match (bytes[i], bytes.get(i + 1).copied()) {
            (b'{', Some(b'{')) => templates += 1,
            (b'}', Some(b'}')) => templates = templates.saturating_sub(1),
            (b'[', Some(b'[')) => links += 1,
            (b']', Some(b']')) => links = links.saturating_sub(1),
            _ => {
                i += 1;
                continue;
            }
        }
        i += 2;
    }
    templates <= outer && links == 0
}

/// Tokenize with default options (no spaces in names)
pub fn tokenize(block: MarkupBlock<'_>) -> Vec<PropertyToken> {
    Tokenizer::default().tokenize(block)
}
