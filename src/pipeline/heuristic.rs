//! Deterministic, rule-table layout classification.
//!
//! Rules are evaluated top to bottom and the first match wins, so the table
//! order is part of the contract: a first slide with an H1 is `hero` even if
//! it also contains a code block.

use crate::layout::{Layout, LayoutDecision};
use crate::pipeline::analyze::FeatureVector;

/// Heuristic decisions at or above this confidence are accepted without
/// consulting the refinement model. Only rules 1 and 2 reach it.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.90;

/// Pick a layout from the slide's structure and zero-based position.
pub fn classify(features: &FeatureVector, position: usize) -> LayoutDecision {
    let f = features;
    let is_h1 = f.heading_level == Some(1);

    // 1
    if position == 0 && is_h1 {
        return LayoutDecision::new(Layout::Hero, "First slide with H1 heading → Hero layout", 0.95);
    }
    // 2
    if is_h1 && f.paragraph_count == 0 && f.list_item_count == 0 && f.total_words < 50 {
        return LayoutDecision::new(
            Layout::SectionBreak,
            "H1 with minimal content → Section break",
            0.90,
        );
    }
    // 3
    if f.code_block_count >= 1 && f.paragraph_count <= 2 {
        return LayoutDecision::new(Layout::CodeFocus, "Code block dominant → Code focus", 0.85);
    }
    // 4
    if f.image_count >= 1 && f.paragraph_count >= 1 {
        return LayoutDecision::new(
            Layout::ImageText,
            "Image and text present → Image-text layout",
            0.80,
        );
    }
    // 5
    if f.list_item_count >= 3 && f.paragraph_count <= 1 {
        return LayoutDecision::new(
            Layout::ListEmphasize,
            "Multiple list items → List emphasize",
            0.85,
        );
    }
    // 6
    if f.quote_count >= 2 {
        return LayoutDecision::new(Layout::Quote, "Multiple quotes → Quote layout", 0.80);
    }
    // 7
    if f.table_count >= 1 {
        return LayoutDecision::new(Layout::Comparison, "Table present → Comparison layout", 0.80);
    }
    // 8
    if f.paragraph_count >= 2 && f.list_item_count >= 2 && f.total_words >= 100 {
        return LayoutDecision::new(
            Layout::TwoColumn,
            "Balanced content → Two-column layout",
            0.70,
        );
    }

    LayoutDecision::new(
        Layout::ContentCenter,
        "No specific pattern matched → Default center layout",
        0.50,
    )
}
