//! The closed set of slide layouts and the decision type produced for each slide.
//!
//! Layouts are a fixed, tagged set rather than free-form strings. Text only
//! becomes a [`Layout`] in two places: the refinement reply parser
//! ([`crate::pipeline::refine::parse_reply`]) and the front-matter override in
//! the loader. Everywhere else the compiler guarantees the name is valid.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the twelve visual templates a slide can be rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// Title slide with a large heading and subtitle.
    Hero,
    /// Section divider with minimal content.
    SectionBreak,
    /// Content aligned to the left.
    ContentLeft,
    /// Content centred. The catch-all layout.
    ContentCenter,
    /// Two columns for balanced prose and lists.
    TwoColumn,
    /// Code-heavy slide.
    CodeFocus,
    /// Image with accompanying text.
    ImageText,
    /// Bullet or numbered lists.
    ListEmphasize,
    /// Prominent quotation or testimonial.
    Quote,
    /// Side-by-side comparison or table.
    Comparison,
    /// Sequential events or process steps.
    Timeline,
    /// Visual diagram or flowchart.
    Diagram,
}

impl Layout {
    /// Every layout, in canonical order.
    pub const ALL: [Layout; 12] = [
        Layout::Hero,
        Layout::SectionBreak,
        Layout::ContentLeft,
        Layout::ContentCenter,
        Layout::TwoColumn,
        Layout::CodeFocus,
        Layout::ImageText,
        Layout::ListEmphasize,
        Layout::Quote,
        Layout::Comparison,
        Layout::Timeline,
        Layout::Diagram,
    ];

    /// The kebab-case name used in front matter, prompts, and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Layout::Hero => "hero",
            Layout::SectionBreak => "section-break",
            Layout::ContentLeft => "content-left",
            Layout::ContentCenter => "content-center",
            Layout::TwoColumn => "two-column",
            Layout::CodeFocus => "code-focus",
            Layout::ImageText => "image-text",
            Layout::ListEmphasize => "list-emphasize",
            Layout::Quote => "quote",
            Layout::Comparison => "comparison",
            Layout::Timeline => "timeline",
            Layout::Diagram => "diagram",
        }
    }

    /// Short description shown to the refinement model.
    pub fn description(self) -> &'static str {
        match self {
            Layout::Hero => "Title slide with large heading and subtitle",
            Layout::SectionBreak => "Section divider with minimal content",
            Layout::ContentLeft => "Content aligned to the left",
            Layout::ContentCenter => "Content centered (default)",
            Layout::TwoColumn => "Two-column layout for balanced content",
            Layout::CodeFocus => "Code-heavy slide with syntax highlighting",
            Layout::ImageText => "Image with accompanying text",
            Layout::ListEmphasize => "Bullet points or numbered lists",
            Layout::Quote => "Prominent quotation or testimonial",
            Layout::Comparison => "Side-by-side comparison or table",
            Layout::Timeline => "Sequential events or process steps",
            Layout::Diagram => "Visual diagram or flowchart",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name one of the twelve layouts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown layout '{0}'")]
pub struct UnknownLayout(pub String);

impl FromStr for Layout {
    type Err = UnknownLayout;

    /// Exact, case-sensitive match on the kebab-case name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Layout::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| UnknownLayout(s.to_string()))
    }
}

/// The outcome of layout selection for one slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDecision {
    pub layout: Layout,
    /// Human-readable justification, shown in debug views.
    pub reasoning: String,
    /// In `[0, 1]`.
    pub confidence: f64,
}

impl LayoutDecision {
    pub fn new(layout: Layout, reasoning: impl Into<String>, confidence: f64) -> Self {
        Self {
            layout,
            reasoning: reasoning.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// How the loader arrived at a slide's [`LayoutDecision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// `layout:` key in the slide's front matter.
    Manual,
    /// Heuristic confidence met the threshold; refinement was skipped.
    Heuristic,
    /// The refinement model's answer was accepted.
    Refined,
    /// Refinement was attempted but failed; the heuristic decision stands.
    RefinementFallback,
    /// No refinement backend was available for this load.
    BasicFallback,
}

impl fmt::Display for DecisionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DecisionSource::Manual => "manual",
            DecisionSource::Heuristic => "heuristic",
            DecisionSource::Refined => "refined",
            DecisionSource::RefinementFallback => "fallback",
            DecisionSource::BasicFallback => "basic",
        };
        f.write_str(s)
    }
}
