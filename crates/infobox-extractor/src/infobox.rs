//! Locates infobox template invocations in article markup

use infobox_domain::MarkupBlock;
use regex::Regex;
use std::sync::LazyLock;

static INFOBOX_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\{\{\s*infobox").expect("infobox pattern is valid"));

/// Infobox blocks of an article's lead section
///
/// Markup from the first `{{Infobox` up to the first `==` heading is split at
/// every line that closes a template (`\n}}`); each piece that opens an
/// infobox becomes one block, starting at its `{{Infobox`. Articles without
/// an infobox yield nothing.
pub fn find_infoboxes(article: &str) -> Vec<MarkupBlock<'_>> {
    let Some(first) = INFOBOX_OPEN.find(article) else {
        return Vec::new();
    };

    let lead = &article[first.start()..];
    let lead = lead.split("==").next().unwrap_or(lead);

    lead.split("\n}}")
        .filter_map(|segment| INFOBOX_OPEN.find(segment).map(|m| &segment[m.start()..]))
        .map(MarkupBlock::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_infobox() {
        let article = "{{Infobox person\n| name = A\n| birth_date = 1990\n}}\n'''A''' is a person.\n\n== Life ==\nText.";
        let blocks = find_infoboxes(article);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].text().starts_with("{{Infobox person"));
        assert!(blocks[0].text().contains("birth_date"));
        assert!(!blocks[0].text().contains("is a person"));
    }

    #[test]
    fn test_stacked_infoboxes() {
        let article = "{{Infobox ship begin\n}}\n{{Infobox ship image\n| Ship image = X.jpg\n}}\n{{infobox ship career\n| Ship builder = [[Yard]]\n}}\nProse";
        let blocks = find_infoboxes(article);
        assert_eq!(blocks.len(), 3);
        assert!(blocks[2].text().starts_with("{{infobox ship career"));
    }

    #[test]
    fn test_search_starts_at_first_infobox() {
        let article = "Intro.\n== History ==\n{{Infobox person\n| name = A\n}}";
        // cut at the first heading after the infobox, not before it
        assert_eq!(find_infoboxes(article).len(), 1);

        let article = "{{Short description|x}}\nIntro only.\n== History ==\nText";
        assert!(find_infoboxes(article).is_empty());
    }

    #[test]
    fn test_no_infobox() {
        assert!(find_infoboxes("").is_empty());
        assert!(find_infoboxes("{{Other template|a=b}}").is_empty());
    }
}
