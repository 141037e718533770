//! Progress-callback trait for per-slide loading events.
//!
//! Inject an [`Arc<dyn DeckProgressCallback>`] via
//! [`crate::config::DeckConfigBuilder::progress_callback`] to receive events
//! as the loader works through the deck. Slides are processed strictly in
//! order, so events for slide *i* always precede events for slide *i + 1*.
//!
//! # Example
//!
//! ```rust
//! use md2deck::{DeckConfig, DeckProgressCallback, DecisionSource, Layout};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct RefineCounter(AtomicUsize);
//!
//! impl DeckProgressCallback for RefineCounter {
//!     fn on_slide_complete(&self, _index: usize, _total: usize, _layout: Layout, source: DecisionSource) {
//!         if source == DecisionSource::Refined {
//!             self.0.fetch_add(1, Ordering::SeqCst);
//!         }
//!     }
//! }
//!
//! let config = DeckConfig::builder()
//!     .progress_callback(Arc::new(RefineCounter(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use crate::layout::{DecisionSource, Layout};
use std::sync::Arc;

/// Called by the loader as it builds each slide.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait DeckProgressCallback: Send + Sync {
    /// Called once, after sources are sorted and before the first slide.
    fn on_load_start(&self, total_slides: usize) {
        let _ = total_slides;
    }

    /// Called before a slide is analysed.
    ///
    /// # Arguments
    /// * `index` — zero-based slide index
    /// * `total` — number of slides in the deck
    fn on_slide_start(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// Called once the slide's layout is decided.
    fn on_slide_complete(&self, index: usize, total: usize, layout: Layout, source: DecisionSource) {
        let _ = (index, total, layout, source);
    }

    /// Called once after the last slide.
    ///
    /// # Arguments
    /// * `total_slides` — slides in the finished deck
    /// * `refined`      — slides whose layout came from the refinement model
    fn on_load_complete(&self, total_slides: usize, refined: usize) {
        let _ = (total_slides, refined);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl DeckProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::DeckConfig`].
pub type ProgressCallback = Arc<dyn DeckProgressCallback>;
