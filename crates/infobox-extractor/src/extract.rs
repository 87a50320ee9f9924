//! Value extractor: reads one field's value from a markup block

use crate::config::{ImportConfig, TokenizerOptions};
use crate::coordinate::calc_coordinate;
use crate::date::normalize_date;
use crate::error::ExtractError;
use crate::tokenizer::{at_field_level, Tokenizer};
use infobox_domain::{ExtractedValue, Locale, MarkupBlock, PropertyClass, PropertyToken};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::{debug, warn};

static COORD_TEMPLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\{\{\s*coord\s*\|").expect("coord template pattern is valid")
});

/// `<ref>...</ref>` footnotes, dropped with their content
static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<ref\b[^>/]*>.*?</ref\s*>").expect("reference pattern is valid")
});

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?\s*>").expect("line break pattern is valid"));

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

static UNTERMINATED_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<.*$").expect("unterminated tag pattern is valid"));

/// Bold/italic quote runs
static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'{2,}").expect("emphasis pattern is valid"));

static TEXT_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*([^\n{}|]+)").expect("text value pattern is valid"));

/// One successfully extracted field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValue {
    /// Field name as written in the block
    pub name: PropertyToken,
    /// Typed value
    pub value: ExtractedValue,
}

/// A field whose value could not be interpreted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldFailure {
    /// Field name as written in the block
    pub name: PropertyToken,
    /// Why the value was rejected
    pub reason: String,
}

/// Everything read from one markup block
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InfoboxRecord {
    /// Fields with a value, in tokenizer order
    pub fields: Vec<FieldValue>,
    /// Fields whose value failed to parse
    pub failures: Vec<FieldFailure>,
}

impl InfoboxRecord {
    /// Value of a field, matched case-insensitively
    pub fn get(&self, name: &str) -> Option<&ExtractedValue> {
        let wanted = name.trim().to_lowercase();
        self.fields
            .iter()
            .find(|f| f.name.as_str().to_lowercase() == wanted)
            .map(|f| &f.value)
    }

    /// True when no field produced a value or a failure
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.failures.is_empty()
    }
}

/// Reads typed field values out of markup blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueExtractor {
    locale: Locale,
    tokenizer: Tokenizer,
}

impl ValueExtractor {
    /// Create an extractor for dates written in `locale`
    pub fn new(locale: Locale, options: TokenizerOptions) -> Self {
        Self {
            locale,
            tokenizer: Tokenizer::new(options),
        }
    }

    /// Extractor matching an import configuration
    pub fn from_config(config: &ImportConfig) -> Self {
        Self::new(config.locale, config.tokenizer)
    }

    /// The tokenizer used by [`ValueExtractor::extract_record`]
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Extract the value of `property` from `block`
    ///
    /// `Ok(None)` means the block has no such field, or the field is empty.
    /// Only the first occurrence of a field is read.
    pub fn extract(
        &self,
        block: MarkupBlock<'_>,
        property: &str,
        class: PropertyClass,
    ) -> Result<Option<ExtractedValue>, ExtractError> {
        self.extract_as(block, property, Some(class))
    }

    /// Extract a field with no known class: coordinates or text
    pub fn extract_unclassified(
        &self,
        block: MarkupBlock<'_>,
        property: &str,
    ) -> Result<Option<ExtractedValue>, ExtractError> {
        self.extract_as(block, property, None)
    }

    /// Extract every field the block defines
    ///
    /// `classify` maps a field name to its class; unclassified fields are read
    /// as coordinates or text. Failures are collected, not returned, so one bad
    /// field never hides its siblings.
    pub fn extract_record<F>(&self, block: MarkupBlock<'_>, classify: F) -> InfoboxRecord
    where
        F: Fn(&PropertyToken) -> Option<PropertyClass>,
    {
        let mut record = InfoboxRecord::default();

        for token in self.tokenizer.tokenize(block) {
            match self.extract_as(block, token.as_str(), classify(&token)) {
                Ok(Some(value)) => {
                    debug!("Field '{}' -> {} '{}'", token, value.kind(), value);
                    record.fields.push(FieldValue { name: token, value });
                }
                Ok(None) => {
                    debug!("Field '{}' is empty", token);
                }
                Err(e) => {
                    warn!("Field '{}' could not be read: {}", token, e);
                    record.failures.push(FieldFailure {
                        name: token,
                        reason: e.to_string(),
                    });
                }
            }
        }

        record
    }

    fn extract_as(
        &self,
        block: MarkupBlock<'_>,
        property: &str,
        class: Option<PropertyClass>,
    ) -> Result<Option<ExtractedValue>, ExtractError> {
        let Some(raw) = raw_value(block.text(), property)? else {
            return Ok(None);
        };
        let raw = REFERENCE.replace_all(raw, "");
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        if class == Some(PropertyClass::TimeValue) {
            return Ok(Some(ExtractedValue::Date(normalize_date(raw, self.locale)?)));
        }

        if COORD_TEMPLATE.is_match(raw) {
            let params: Vec<&str> = template_body(raw).split('|').skip(1).collect();
            return Ok(Some(ExtractedValue::Coordinate(calc_coordinate(&params)?)));
        }
        if class == Some(PropertyClass::Coordinate) {
            return Err(ExtractError::MissingCoordinateTemplate(property.to_string()));
        }

        Ok(text_value(raw))
    }
}

/// Extract with default options (English dates, unspaced names)
pub fn extract(
    block: MarkupBlock<'_>,
    property: &str,
    class: PropertyClass,
) -> Result<Option<ExtractedValue>, ExtractError> {
    ValueExtractor::default().extract(block, property, class)
}

/// Raw text of the first `|property=` field in `text`
///
/// Parameters of templates and links nested in other fields are skipped.
fn raw_value<'a>(text: &'a str, property: &str) -> Result<Option<&'a str>, ExtractError> {
    let name = property
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    if name.is_empty() {
        return Ok(None);
    }

    let pattern = Regex::new(&format!(r"(?i)\|\s*{}\s*=", name))?;
    let span = pattern
        .find_iter(text)
        .find(|m| at_field_level(text, m.start()))
        .map(|m| field_span(&text[m.end()..]));
    Ok(span)
}

/// Value text up to the next field or the end of the template
///
/// Pipes inside nested templates and links belong to the value.
fn field_span(rest: &str) -> &str {
    let bytes = rest.as_bytes();
    let mut templates = 0usize;
    let mut links = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        let pair = bytes.get(i + 1).copied();
        match (bytes[i], pair) {
            (b'{', Some(b'{')) => {
                templates += 1;
                i += 2;
                continue;
            }
            (b'}', Some(b'}')) => {
                if templates == 0 {
                    break;
                }
                templates -= 1;
                i += 2;
                continue;
            }
            (b'[', Some(b'[')) => {
                links += 1;
                i += 2;
                continue;
            }
            (b']', Some(b']')) => {
                links = links.saturating_sub(1);
                i += 2;
                continue;
            }
            (b'|', _) if templates == 0 && links == 0 => break,
            (b'\n', _) if templates == 0 && links == 0 => {
                let next = rest[i + 1..].trim_start_matches([' ', '\t']);
                if next.starts_with('|') || next.starts_with("}}") {
                    break;
                }
            }
            _ => {}
        }
        i += 1;
    }

    rest[..i].trim()
}

/// Inside of the first `{{...}}` in `raw`, without the braces
fn template_body(raw: &str) -> &str {
    let Some(start) = raw.find("{{") else {
        return "";
    };
    let inner = &raw[start + 2..];
    let bytes = inner.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;

    while i + 1 < bytes.len() {
        match (bytes[i], bytes[i + 1]) {
            (b'{', b'{') => {
                depth += 1;
                i += 2;
            }
            (b'}', b'}') if depth == 0 => return &inner[..i],
            (b'}', b'}') => {
                depth -= 1;
                i += 2;
            }
            _ => i += 1,
        }
    }
    inner
}

/// Plain text lines of a raw value
fn text_value(raw: &str) -> Option<ExtractedValue> {
    let captured = TEXT_VALUE.captures(raw)?.get(1)?.as_str();

    let lines = LINE_BREAK
        .split(captured)
        .map(|line| {
            let line = TAG.replace_all(line, "");
            let line = UNTERMINATED_TAG.replace(&line, "");
            let line = EMPHASIS.replace_all(&line, "");
            line.trim()
                .trim_end_matches(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | ')' | ']')))
                .to_string()
        })
        .collect();

    ExtractedValue::from_lines(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use infobox_domain::PartialDate;

    const PERSON: &str = "{{Infobox person
| name        = '''Example Person'''
| image       = [[File:Example.jpg|thumb]]
| birth_date  = {{birth date|1990|5|12|df=y}}
| birth_place = [[Springfield]]<br>[[Illinois]]
| occupation  = Engineer<ref>{{cite web|url=http://x}}</ref>
| spouse      =
| name        = Someone Else
}}";

    fn block() -> MarkupBlock<'static> {
        MarkupBlock::new(PERSON)
    }

    fn text(s: &str) -> ExtractedValue {
        ExtractedValue::PlainText(s.to_string())
    }

    #[test]
    fn test_scenario_a_date_field() {
        let b = MarkupBlock::new("{{Infobox person\n|birth_date=12 May 1990\n}}");
        let value = extract(b, "birth_date", PropertyClass::TimeValue).unwrap();
        assert_eq!(value, Some(ExtractedValue::Date(PartialDate::ymd(1990, 5, 12).unwrap())));
    }

    #[test]
    fn test_scenario_b_coordinate_template() {
        let b = MarkupBlock::new("| coordinates = {{coord|40|26|46|N|79|58|56|W|display=title}}\n");
        let Some(ExtractedValue::Coordinate(c)) =
            extract(b, "coordinates", PropertyClass::Coordinate).unwrap()
        else {
            panic!("expected a coordinate");
        };
        assert!((c.lat() - 40.44611).abs() < 1e-5);
        assert!((c.lon() + 79.98222).abs() < 1e-5);
    }

    #[test]
    fn test_date_template_with_pipes() {
        let value = extract(block(), "birth_date", PropertyClass::TimeValue).unwrap();
        assert_eq!(value, Some(ExtractedValue::Date(PartialDate::ymd(1990, 5, 12).unwrap())));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let value = extract(block(), "name", PropertyClass::EntityReference).unwrap();
        assert_eq!(value, Some(text("Example Person")));
    }

    #[test]
    fn test_line_breaks_make_a_list() {
        let value = extract(block(), "birth_place", PropertyClass::EntityReference).unwrap();
        assert_eq!(
            value,
            Some(ExtractedValue::TextList(vec![
                "[[Springfield]]".to_string(),
                "[[Illinois]]".to_string()
            ]))
        );
    }

    #[test]
    fn test_references_and_tags_are_stripped() {
        let value = extract(block(), "occupation", PropertyClass::MonolingualText).unwrap();
        assert_eq!(value, Some(text("Engineer")));

        let b = MarkupBlock::new("|motto=Semper <small>fidelis</small> <!-- note -->\n");
        let value = extract(b, "motto", PropertyClass::MonolingualText).unwrap();
        assert_eq!(value, Some(text("Semper fidelis")));

        let b = MarkupBlock::new("|motto=Semper fidelis <span\n");
        let value = extract(b, "motto", PropertyClass::MonolingualText).unwrap();
        assert_eq!(value, Some(text("Semper fidelis")));
    }

    #[test]
    fn test_date_followed_by_template() {
        let b = MarkupBlock::new("{{Infobox person\n| birth_date = 12 May 1990 {{citation needed}}\n}}");
        let value = extract(b, "birth_date", PropertyClass::TimeValue).unwrap();
        assert_eq!(value, Some(ExtractedValue::Date(PartialDate::ymd(1990, 5, 12).unwrap())));

        let b = MarkupBlock::new("| built = 1901{{efn|Rebuilt in 1950}}\n");
        let value = extract(b, "built", PropertyClass::TimeValue).unwrap();
        assert_eq!(value, Some(ExtractedValue::Date(PartialDate::year(1901).unwrap())));
    }

    #[test]
    fn test_nested_parameter_does_not_shadow_field() {
        let b = MarkupBlock::new(
            "{{Infobox officeholder\n| occupation = Engineer<ref>{{cite web|url=http://x|title=Foo}}</ref>\n| title = Mayor\n}}",
        );
        let value = extract(b, "title", PropertyClass::MonolingualText).unwrap();
        assert_eq!(value, Some(text("Mayor")));
        assert_eq!(extract(b, "url", PropertyClass::Identifier).unwrap(), None);

        let b = MarkupBlock::new("| event = Fire {{sfn|Smith|date=1901}}\n| date = 3 March 1902\n");
        let value = extract(b, "date", PropertyClass::TimeValue).unwrap();
        assert_eq!(value, Some(ExtractedValue::Date(PartialDate::ymd(1902, 3, 3).unwrap())));
    }

    #[test]
    fn test_link_with_label_keeps_target() {
        let value = extract(block(), "image", PropertyClass::MediaReference).unwrap();
        assert_eq!(value, Some(text("[[File:Example.jpg")));
    }

    #[test]
    fn test_missing_and_empty_fields() {
        assert_eq!(extract(block(), "death_date", PropertyClass::TimeValue).unwrap(), None);
        assert_eq!(extract(block(), "spouse", PropertyClass::EntityReference).unwrap(), None);
        assert_eq!(extract(MarkupBlock::new(""), "name", PropertyClass::Identifier).unwrap(), None);
    }

    #[test]
    fn test_parse_failures_are_typed() {
        let b = MarkupBlock::new("|built=sometime long ago maybe\n");
        assert!(matches!(
            extract(b, "built", PropertyClass::TimeValue),
            Err(ExtractError::Date(_))
        ));

        let b = MarkupBlock::new("|coordinates={{coord|40|79}}\n");
        assert!(matches!(
            extract(b, "coordinates", PropertyClass::Coordinate),
            Err(ExtractError::Coordinate(_))
        ));

        let b = MarkupBlock::new("|coordinates=north of town\n");
        assert!(matches!(
            extract(b, "coordinates", PropertyClass::Coordinate),
            Err(ExtractError::MissingCoordinateTemplate(_))
        ));
    }

    #[test]
    fn test_spaced_field_name() {
        let b = MarkupBlock::new("{{Infobox ship career\n| Ship  builder = [[Harland and Wolff]]\n}}");
        let value = extract(b, "Ship builder", PropertyClass::EntityReference).unwrap();
        assert_eq!(value, Some(text("[[Harland and Wolff]]")));
    }

    #[test]
    fn test_extract_record_collects_failures() {
        let b = MarkupBlock::new("{{Infobox building\n|name=Old Mill\n|built=not a date at all\n|architect=[[A. Smith]]\n}}");
        let extractor = ValueExtractor::default();
        let record = extractor.extract_record(b, |t| {
            (t.as_str() == "built").then_some(PropertyClass::TimeValue)
        });

        assert_eq!(record.fields.len(), 2);
        assert_eq!(record.get("NAME"), Some(&text("Old Mill")));
        assert_eq!(record.get("architect"), Some(&text("[[A. Smith]]")));
        assert_eq!(record.failures.len(), 1);
        assert_eq!(record.failures[0].name.as_str(), "built");
    }

    #[test]
    fn test_field_span_respects_nesting() {
        assert_eq!(field_span(" {{a|b}} [[c|d]] | next"), "{{a|b}} [[c|d]]");
        assert_eq!(field_span(" one\n two\n| next"), "one\n two");
        assert_eq!(field_span(" last }}"), "last");
    }

    #[test]
    fn test_template_body() {
        assert_eq!(template_body("{{coord|1|2}} trailing"), "coord|1|2");
        assert_eq!(template_body("{{coord|{{x}}|2}}"), "coord|{{x}}|2");
        assert_eq!(template_body("no template"), "");
    }
}
