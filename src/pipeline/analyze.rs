//! Structural analysis: summarise a slide's Markdown as a [`FeatureVector`].
//!
//! Every rule is an independent pattern scan over the *raw* Markdown body,
//! not over rendered HTML. Malformed Markdown only ever lowers the counts;
//! [`analyze`] cannot fail.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Structural summary of one slide, the input to layout classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Level (1–6) of the first ATX heading, if any.
    pub heading_level: Option<u8>,
    pub heading_text: Option<String>,
    pub paragraph_count: usize,
    pub list_item_count: usize,
    pub code_block_count: usize,
    pub image_count: usize,
    pub quote_count: usize,
    pub table_count: usize,
    pub total_characters: usize,
    /// Whitespace-delimited words, or non-whitespace characters when the
    /// slide contains CJK text.
    pub total_words: usize,
}

/// Analyse a Markdown body (front matter already removed).
pub fn analyze(markdown: &str) -> FeatureVector {
    let text = normalise_line_endings(markdown);
    let (heading_level, heading_text) = first_heading(&text);

    FeatureVector {
        heading_level,
        heading_text,
        paragraph_count: count_paragraphs(&text),
        list_item_count: RE_LIST_ITEM.find_iter(&text).count(),
        code_block_count: RE_CODE_BLOCK.find_iter(&text).count(),
        image_count: RE_IMAGE.find_iter(&text).count(),
        quote_count: RE_QUOTE.find_iter(&text).count(),
        table_count: RE_TABLE_SEPARATOR.find_iter(&text).count(),
        total_characters: text.chars().count(),
        total_words: count_words(&text),
    }
}

static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(#{1,6})[ \t]+(.*)$").unwrap());
static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n(?:[ \t]*\n)+").unwrap());
static RE_LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*[-*+][ \t]+").unwrap());
static RE_CODE_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```").unwrap());
static RE_INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`]+`").unwrap());
static RE_IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[.*?\]\(.*?\)").unwrap());
static RE_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(.*?\)").unwrap());
static RE_QUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^>[ \t]+").unwrap());
static RE_TABLE_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*\|[ \t]*[-:]+[ \t]*\|").unwrap());
static RE_MARKDOWN_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[#*_~`>|\-]").unwrap());

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

fn first_heading(text: &str) -> (Option<u8>, Option<String>) {
    match RE_HEADING.captures(text) {
        Some(caps) => {
            let level = caps[1].len() as u8;
            let title = caps[2].trim();
            let title = (!title.is_empty()).then(|| title.to_string());
            (Some(level), title)
        }
        None => (None, None),
    }
}

/// Blocks separated by blank lines that are not headings, fences, lists,
/// quotes, or table rows.
fn count_paragraphs(text: &str) -> usize {
    RE_BLANK_LINES
        .split(text)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .filter(|block| {
            !(block.starts_with('#')
                || block.starts_with("```")
                || block.starts_with('-')
                || block.starts_with('*')
                || block.starts_with('+')
                || block.starts_with('>')
                || block.starts_with('|'))
        })
        .count()
}

fn count_words(text: &str) -> usize {
    let stripped = RE_CODE_BLOCK.replace_all(text, "");
    let stripped = RE_INLINE_CODE.replace_all(&stripped, "");
    let stripped = RE_IMAGE.replace_all(&stripped, "");
    let stripped = RE_LINK.replace_all(&stripped, "$1");
    let stripped = RE_MARKDOWN_PUNCT.replace_all(&stripped, "");
    let stripped = stripped.trim();

    // One CJK character anywhere switches the whole slide to character mode.
    if stripped.chars().any(is_cjk) {
        stripped.chars().filter(|c| !c.is_whitespace()).count()
    } else {
        stripped.split_whitespace().count()
    }
}

fn is_cjk(c: char) -> bool {
    matches!(
        c,
        '\u{3000}'..='\u{303F}'
            | '\u{3040}'..='\u{309F}'
            | '\u{30A0}'..='\u{30FF}'
            | '\u{FF00}'..='\u{FF9F}'
            | '\u{4E00}'..='\u{9FAF}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_all_zero() {
        assert_eq!(analyze(""), FeatureVector::default());
    }

    #[test]
    fn first_heading_wins() {
        let f = analyze("Intro text\n\n## Second level  \n\n# Later h1");
        assert_eq!(f.heading_level, Some(2));
        assert_eq!(f.heading_text.as_deref(), Some("Second level"));
    }

    #[test]
    fn seven_hashes_is_not_a_heading() {
        let f = analyze("####### too deep");
        assert_eq!(f.heading_level, None);
        assert_eq!(f.heading_text, None);
    }

    #[test]
    fn hashtag_without_space_is_not_a_heading() {
        assert_eq!(analyze("#rustlang rocks").heading_level, None);
    }

    #[test]
    fn paragraphs_skip_structural_blocks() {
        let md = "# Title\n\nFirst paragraph\nstill first.\n\n- item\n- item\n\n> quoted\n\n| a | b |\n|---|---|\n\n```\ncode\n```\n\nSecond paragraph.";
        assert_eq!(analyze(md).paragraph_count, 2);
    }

    #[test]
    fn whitespace_only_lines_separate_paragraphs() {
        assert_eq!(analyze("one\n   \ntwo").paragraph_count, 2);
    }

    #[test]
    fn list_items_include_nested_and_plus() {
        let md = "- a\n  * nested\n+ plus\n---\n-not an item";
        assert_eq!(analyze(md).list_item_count, 3);
    }

    #[test]
    fn code_blocks_are_paired_fences() {
        let md = "```rust\nfn main() {}\n```\n\ntext\n\n```\nmore\n```\n\n```\nunterminated";
        assert_eq!(analyze(md).code_block_count, 2);
    }

    #[test]
    fn images_quotes_tables() {
        let md = "![logo](logo.png) and ![](x.svg)\n\n> one\n> two\n>no space\n\n| A | B |\n| :-- | --: |\n| 1 | 2 |";
        let f = analyze(md);
        assert_eq!(f.image_count, 2);
        assert_eq!(f.quote_count, 2);
        assert_eq!(f.table_count, 1);
    }

    #[test]
    fn word_count_strips_markup() {
        // "Read the docs now" — link text kept, code and image dropped.
        let md = "Read [the docs](https://docs.rs) `inline` now ![img](a.png)\n\n```\nlots of code words here\n```";
        assert_eq!(analyze(md).total_words, 4);
    }

    #[test]
    fn cjk_switches_to_character_mode() {
        let f = analyze("こんにちは 世界");
        assert_eq!(f.total_words, 7);
        // Mixed script: every non-whitespace character counts.
        assert_eq!(analyze("Rust と 日本").total_words, 7);
    }

    #[test]
    fn crlf_is_normalised() {
        let f = analyze("# Title\r\n\r\nBody text\r\n\r\n- a\r\n- b");
        assert_eq!(f.heading_text.as_deref(), Some("Title"));
        assert_eq!(f.paragraph_count, 1);
        assert_eq!(f.list_item_count, 2);
    }

    #[test]
    fn analyze_is_idempotent() {
        let md = "# Deck\n\nSome *text* with [a link](x).\n\n- one\n- two\n- three";
        assert_eq!(analyze(md), analyze(md));
    }

    #[test]
    fn garbage_never_panics() {
        for md in ["```", "![", "[](", "|", "> ", "#\n#\n", "\u{FEFF}\u{0}", "-\t", "```````"] {
            let f = analyze(md);
            assert!(f.total_characters <= md.chars().count() + 1);
        }
    }
}
