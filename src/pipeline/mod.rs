//! Pipeline stages for Markdown-to-deck loading.
//!
//! Each submodule implements one step. Only [`input`] and [`refine`] do
//! I/O; everything else is a pure function of its arguments.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ frontmatter ──▶ render ──▶ analyze ──▶ heuristic ──▶ refine
//! (paths/URLs) (YAML split)   (HTML)   (features)   (9 rules)   (model, optional)
//! ```
//!
//! 1. [`input`]       — resolve files, directories and URLs; natural ordering
//! 2. [`frontmatter`] — split the optional `---` YAML block from the body
//! 3. [`render`]      — Markdown body to HTML for the presentation layer
//! 4. [`analyze`]     — structural feature counts for one slide
//! 5. [`heuristic`]   — ordered rules mapping features and position to a layout
//! 6. [`refine`]      — one model call per low-confidence slide, falling back
//!    to the heuristic decision on any failure

pub mod analyze;
pub mod frontmatter;
pub mod heuristic;
pub mod input;
pub mod refine;
pub mod render;
