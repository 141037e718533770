//! Output types: slide records, the finished deck, and load statistics.

use crate::layout::{DecisionSource, Layout, LayoutDecision};
use crate::pipeline::analyze::FeatureVector;
use crate::pipeline::frontmatter::FrontMatter;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A source document after front-matter extraction and rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedContent {
    pub front_matter: FrontMatter,
    /// Markdown body with the metadata block removed.
    pub raw_markdown: String,
    /// Rendered body, ready for the presentation layer.
    pub html: String,
}

/// One slide of a loaded deck. Immutable once the loader returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideRecord {
    pub id: Uuid,
    /// Where the slide came from, e.g. `01-intro.md`.
    pub source_name: String,
    pub content: ParsedContent,
    pub features: FeatureVector,
    pub decision: LayoutDecision,
    pub decision_source: DecisionSource,
    /// Zero-based position in the deck.
    pub index: usize,
}

impl SlideRecord {
    pub fn layout(&self) -> Layout {
        self.decision.layout
    }

    /// Why this layout was chosen.
    pub fn justification(&self) -> &str {
        &self.decision.reasoning
    }
}

/// Counters collected while building a deck.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckStats {
    pub total_slides: usize,
    pub manual: usize,
    /// Accepted at heuristic confidence without refinement.
    pub heuristic: usize,
    pub refined: usize,
    pub refinement_fallbacks: usize,
    /// Slides classified while no refinement backend was available.
    pub basic_fallbacks: usize,
    /// Calls made to the refinement backend.
    pub refinement_calls: usize,
    pub total_duration_ms: u64,
}

impl DeckStats {
    pub(crate) fn record(&mut self, source: DecisionSource) {
        self.total_slides += 1;
        match source {
            DecisionSource::Manual => self.manual += 1,
            DecisionSource::Heuristic => self.heuristic += 1,
            DecisionSource::Refined => {
                self.refined += 1;
                self.refinement_calls += 1;
            }
            DecisionSource::RefinementFallback => {
                self.refinement_fallbacks += 1;
                self.refinement_calls += 1;
            }
            DecisionSource::BasicFallback => self.basic_fallbacks += 1,
        }
    }
}

/// An ordered, fully built deck.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub slides: Vec<SlideRecord>,
    pub stats: DeckStats,
}

impl Deck {
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn layouts(&self) -> Vec<Layout> {
        self.slides.iter().map(SlideRecord::layout).collect()
    }
}
