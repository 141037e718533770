//! Error types for the md2deck library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`DeckError`] — **Fatal**: the load cannot produce a deck at all
//!   (unreadable source, broken front matter, bad configuration). Returned as
//!   `Err(DeckError)` from the top-level `load_deck*` functions, and the
//!   partially built deck is discarded.
//!
//! * [`RefineError`] — **Non-fatal**: the refinement pass for one slide
//!   failed (service down, garbled reply, unknown layout name). It never
//!   leaves the advisor; it is carried inside
//!   [`crate::pipeline::refine::Refinement::FellBack`] next to the heuristic
//!   decision that replaced it.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the md2deck library.
#[derive(Debug, Error)]
pub enum DeckError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file or directory was not found at the given path.
    #[error("Markdown source not found: '{path}'\nCheck the path exists and is readable.")]
    SourceNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but could not be read as UTF-8 text.
    #[error("Failed to read source '{name}': {source}")]
    SourceUnreadable {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The input string is not a usable path or URL.
    #[error("Invalid input '{input}': not a file, a directory, or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// A directory input contained no Markdown files, or no inputs were given.
    #[error("No Markdown sources found in '{path}'")]
    NoSources { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Content errors ────────────────────────────────────────────────────
    /// The metadata block at the top of a source is not valid YAML.
    #[error("Invalid front matter in '{name}': {detail}")]
    InvalidFrontMatter { name: String, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a refinement attempt was discarded in favour of the heuristic decision.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum RefineError {
    /// No text-generation backend could be constructed.
    #[error("refinement backend unavailable: {0}")]
    Unavailable(String),

    /// The backend returned an error.
    #[error("refinement call to '{backend}' failed: {detail}")]
    ServiceFailed { backend: String, detail: String },

    /// The backend did not answer in time.
    #[error("refinement call timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The reply contained no balanced `{...}` object.
    #[error("no JSON object found in reply")]
    NoJsonObject,

    /// The object was found but is not valid JSON.
    #[error("malformed JSON in reply: {0}")]
    MalformedJson(String),

    /// The object has no string `layout` field.
    #[error("reply has no 'layout' field")]
    MissingLayout,

    /// The `layout` field names something outside the closed set.
    #[error("reply names unknown layout '{0}'")]
    UnknownLayout(String),
}
