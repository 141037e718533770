//! Presentation state: the loaded deck plus the current position.
//!
//! [`DeckState`] is an explicit container owned by whoever drives the
//! presentation (a CLI, a web server, a UI shell). It changes only through
//! the operations defined here. A new deck replaces the old one wholesale,
//! and a failed load leaves an empty deck with one error message. There is
//! never a half-built deck to render.

use crate::config::DeckConfig;
use crate::error::DeckError;
use crate::load::load_deck;
use crate::output::{Deck, SlideRecord};
use crate::pipeline::input::SourceDocument;
use serde::Serialize;
use tracing::error;

/// Direction of the most recent navigation, for transition effects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// The deck currently shown, the position within it, and load status.
///
/// Invariant: `position < slides.len()` whenever `slides` is non-empty, and
/// `error` is `Some` only while `slides` is empty.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeckState {
    slides: Vec<SlideRecord>,
    position: usize,
    is_loading: bool,
    error: Option<String>,
    direction: Direction,
}

impl DeckState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slides(&self) -> &[SlideRecord] {
        &self.slides
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn current(&self) -> Option<&SlideRecord> {
        self.slides.get(self.position)
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Mark a load as in flight and clear any previous error.
    ///
    /// Loads are not serialised here; callers should not start another load
    /// while [`Self::is_loading`] is true.
    pub fn begin_load(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    /// Install the result of a load.
    ///
    /// A deck replaces the current slides and resets the position. An error
    /// clears the deck and records a single user-facing message.
    pub fn finish_load(&mut self, result: Result<Deck, DeckError>) {
        self.is_loading = false;
        self.position = 0;
        self.direction = Direction::Forward;
        match result {
            Ok(deck) => {
                self.slides = deck.slides;
                self.error = None;
            }
            Err(e) => {
                error!("Failed to load slides: {}", e);
                self.slides = Vec::new();
                self.error = Some(format!("Failed to load slides: {e}"));
            }
        }
    }

    /// [`Self::begin_load`], [`load_deck`], [`Self::finish_load`] in one call.
    pub async fn load(&mut self, sources: Vec<SourceDocument>, config: &DeckConfig) {
        self.begin_load();
        let result = load_deck(sources, config).await;
        self.finish_load(result);
    }

    /// Advance one slide. No-op on the last slide.
    pub fn next_slide(&mut self) {
        if self.position + 1 < self.slides.len() {
            self.position += 1;
            self.direction = Direction::Forward;
        }
    }

    /// Go back one slide. No-op on the first slide.
    pub fn previous_slide(&mut self) {
        if self.position > 0 {
            self.position -= 1;
            self.direction = Direction::Backward;
        }
    }

    /// Jump to `index`. No-op when out of range.
    pub fn go_to_slide(&mut self, index: usize) {
        if index < self.slides.len() {
            self.direction = if index > self.position {
                Direction::Forward
            } else {
                Direction::Backward
            };
            self.position = index;
        }
    }

    /// Drop the deck and return to the initial state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
