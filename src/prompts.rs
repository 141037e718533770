//! Prompt construction for LLM layout refinement.
//!
//! Centralising the prompt here serves two purposes:
//!
//! 1. **Single source of truth** — adding a layout or changing the reply
//!    contract means editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect the rendered prompt directly
//!    without a live model.

use crate::layout::{Layout, LayoutDecision};
use crate::pipeline::analyze::FeatureVector;
use std::fmt::Write;

/// Everything the model is told about one slide.
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    pub features: &'a FeatureVector,
    /// Slide body; only the first `excerpt_chars` characters are sent.
    pub content: &'a str,
    pub previous_layout: Option<Layout>,
    /// Zero-based.
    pub position: usize,
    pub heuristic: &'a LayoutDecision,
    pub excerpt_chars: usize,
}

/// Placeholder for the previous layout on the first slide.
pub const NO_PREVIOUS_LAYOUT: &str = "none (first slide)";

/// Build the layout-selection prompt. The reply contract is a single JSON
/// object with `layout`, `reasoning`, and `confidence`.
pub fn layout_prompt(input: &PromptInput<'_>) -> String {
    let f = input.features;
    let mut prompt = String::from(
        "You are an expert presentation designer. Analyze the following slide content and select the most appropriate layout.\n\n**Available Layouts:**\n",
    );
    for layout in Layout::ALL {
        let _ = writeln!(prompt, "- {}: {}", layout, layout.description());
    }

    let heading_level = f
        .heading_level
        .map(|l| format!("H{l}"))
        .unwrap_or_else(|| "None".to_string());
    let previous = input
        .previous_layout
        .map(|l| l.to_string())
        .unwrap_or_else(|| NO_PREVIOUS_LAYOUT.to_string());

    let _ = write!(
        prompt,
        "\n**Content Analysis:**\n\
- Slide number: {}\n\
- Heading level: {}\n\
- Heading text: {}\n\
- Paragraphs: {}\n\
- List items: {}\n\
- Code blocks: {}\n\
- Images: {}\n\
- Quotes: {}\n\
- Tables: {}\n\
- Total words: {}\n\n\
**Previous Layout:** {}\n\n\
**Heuristic Suggestion:** {} (confidence: {:.2})\n\n\
**Content Preview:**\n```\n{}\n```\n\n",
        input.position + 1,
        heading_level,
        f.heading_text.as_deref().unwrap_or("None"),
        f.paragraph_count,
        f.list_item_count,
        f.code_block_count,
        f.image_count,
        f.quote_count,
        f.table_count,
        f.total_words,
        previous,
        input.heuristic.layout,
        input.heuristic.confidence,
        excerpt(input.content, input.excerpt_chars),
    );

    prompt.push_str(
        r#"**Instructions:**
1. Consider the content structure and type
2. Consider flow and consistency with the previous layout
3. Select ONE layout from the list above that best fits the content
4. Give your reasoning in ONE sentence

**Response Format (JSON only):**
{
  "layout": "layout-name",
  "reasoning": "Your one-sentence reasoning",
  "confidence": 0.95
}"#,
    );
    prompt
}

/// First `max_chars` characters of `content`, never splitting a UTF-8 sequence.
pub fn excerpt(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &content[..byte_idx],
        None => content,
    }
}
