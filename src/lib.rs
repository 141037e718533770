//! # md2deck
//!
//! Turn a folder of Markdown files into a slide deck, choosing a visual
//! layout for every slide from its content.
//!
//! ## Why this crate?
//!
//! Most slide tools make the author pick a layout per slide. Authors of
//! Markdown decks mostly don't want to: a slide that is one big heading is
//! obviously a title slide, a slide that is a code block is obviously a code
//! slide. This crate reads the structure of each slide, applies a short list
//! of ordered rules, and only asks a language model when the rules are not
//! confident. When no model is reachable the rules alone still produce a
//! complete deck.
//!
//! ## Pipeline Overview
//!
//! ```text
//! *.md files / URLs
//!  │
//!  ├─ 1. Input      resolve files, directories and URLs; natural-sort by name
//!  ├─ 2. Parse      split YAML front matter, render the body to HTML
//!  ├─ 3. Analyze    count headings, lists, code, images, quotes, tables …
//!  ├─ 4. Classify   nine ordered rules → layout + confidence
//!  ├─ 5. Refine     below the threshold only: ask the model, or keep the rules
//!  └─ 6. Output     ordered SlideRecords + per-deck stats
//! ```
//!
//! Slides are processed one at a time in deck order, because every decision
//! may depend on the layout chosen for the slide before it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use md2deck::{load_deck_from_inputs, DeckConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Refinement backend auto-detected from ANTHROPIC_API_KEY / EDGEQUAKE_LLM_PROVIDER
//!     let config = DeckConfig::default();
//!     let deck = load_deck_from_inputs(&["slides/".to_string()], &config).await?;
//!     for slide in &deck.slides {
//!         println!("{:>3}  {:<14} {}", slide.index + 1, slide.layout(), slide.source_name);
//!     }
//!     eprintln!("refinement calls: {}", deck.stats.refinement_calls);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `md2deck` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! md2deck = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod deck;
pub mod error;
pub mod generator;
pub mod layout;
pub mod load;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{DeckConfig, DeckConfigBuilder, DEFAULT_MODEL};
pub use deck::{DeckState, Direction};
pub use error::{DeckError, RefineError};
pub use generator::{GenerationOptions, ProviderGenerator, TextGenerator};
pub use layout::{DecisionSource, Layout, LayoutDecision, UnknownLayout};
pub use load::{
    load_deck, load_deck_from_inputs, load_deck_sync, resolve_generator, save_deck,
    select_layout, BASIC_FALLBACK_REASONING, MANUAL_REASONING,
};
pub use output::{Deck, DeckStats, ParsedContent, SlideRecord};
pub use pipeline::analyze::{analyze, FeatureVector};
pub use pipeline::frontmatter::FrontMatter;
pub use pipeline::heuristic::{classify, DEFAULT_CONFIDENCE_THRESHOLD};
pub use pipeline::input::SourceDocument;
pub use pipeline::refine::{LayoutAdvisor, RefineRequest, Refinement};
pub use progress::{DeckProgressCallback, NoopProgressCallback, ProgressCallback};
