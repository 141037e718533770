//! LLM refinement of low-confidence heuristic decisions.
//!
//! The advisor is strictly additive: it either returns a validated,
//! better-informed decision or hands back the heuristic decision untouched.
//! No failure on this path (backend error, timeout, garbled reply, a layout
//! name outside the closed set) ever reaches the caller as an error.
//!
//! ## One call, no retries
//!
//! A refinement is optional polish. A failed call falls back immediately
//! instead of retrying, so one flaky request cannot stall a whole deck.

use crate::config::DeckConfig;
use crate::error::RefineError;
use crate::generator::{GenerationOptions, TextGenerator};
use crate::layout::{Layout, LayoutDecision};
use crate::prompts::{layout_prompt, PromptInput};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

/// Confidence assumed when the reply omits it.
pub const DEFAULT_REFINED_CONFIDENCE: f64 = 0.8;

/// Reasoning assumed when the reply omits it.
pub const DEFAULT_REFINED_REASONING: &str = "Refined layout selection";

/// Outcome of one refinement attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Refinement {
    /// The model's answer passed validation.
    Refined(LayoutDecision),
    /// Something failed; `decision` is the heuristic decision, unchanged.
    FellBack {
        decision: LayoutDecision,
        reason: RefineError,
    },
}

impl Refinement {
    pub fn decision(&self) -> &LayoutDecision {
        match self {
            Refinement::Refined(d) => d,
            Refinement::FellBack { decision, .. } => decision,
        }
    }

    pub fn into_decision(self) -> LayoutDecision {
        match self {
            Refinement::Refined(d) => d,
            Refinement::FellBack { decision, .. } => decision,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Refinement::FellBack { .. })
    }
}

/// What the advisor knows about the slide being refined.
#[derive(Debug, Clone, Copy)]
pub struct RefineRequest<'a> {
    pub features: &'a crate::pipeline::analyze::FeatureVector,
    /// Slide body; the prompt only carries an excerpt.
    pub content: &'a str,
    pub previous_layout: Option<Layout>,
    /// Zero-based.
    pub position: usize,
}

/// Sends low-confidence slides to a [`TextGenerator`] and validates the answer.
pub struct LayoutAdvisor {
    generator: Arc<dyn TextGenerator>,
    options: GenerationOptions,
    excerpt_chars: usize,
    timeout: Duration,
}

impl LayoutAdvisor {
    pub fn new(generator: Arc<dyn TextGenerator>, config: &DeckConfig) -> Self {
        Self {
            generator,
            options: config.generation_options(),
            excerpt_chars: config.excerpt_chars,
            timeout: Duration::from_secs(config.api_timeout_secs),
        }
    }

    pub fn backend_name(&self) -> &str {
        self.generator.name()
    }

    /// Ask the model to confirm or replace `heuristic`.
    ///
    /// Exactly one generation call is made. On any failure the returned
    /// [`Refinement::FellBack`] carries `heuristic` verbatim.
    pub async fn refine(&self, request: &RefineRequest<'_>, heuristic: &LayoutDecision) -> Refinement {
        let start = Instant::now();
        let prompt = layout_prompt(&PromptInput {
            features: request.features,
            content: request.content,
            previous_layout: request.previous_layout,
            position: request.position,
            heuristic,
            excerpt_chars: self.excerpt_chars,
        });

        let outcome = match timeout(self.timeout, self.generator.generate(&prompt, &self.options)).await {
            Ok(Ok(reply)) => parse_reply(&reply),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(RefineError::Timeout {
                secs: self.timeout.as_secs(),
            }),
        };

        match outcome {
            Ok(decision) => {
                debug!(
                    "Slide {}: refined to {} ({:.2}) in {:?}",
                    request.position + 1,
                    decision.layout,
                    decision.confidence,
                    start.elapsed()
                );
                Refinement::Refined(decision)
            }
            Err(reason) => {
                warn!(
                    "Slide {}: refinement failed, keeping heuristic {} — {}",
                    request.position + 1,
                    heuristic.layout,
                    reason
                );
                Refinement::FellBack {
                    decision: heuristic.clone(),
                    reason,
                }
            }
        }
    }
}

/// Validate a free-text model reply into a [`LayoutDecision`].
///
/// The first balanced `{...}` object is parsed; `layout` must name one of
/// the twelve layouts. `confidence` is clamped into `[0, 1]` and defaults to
/// [`DEFAULT_REFINED_CONFIDENCE`]; an empty or missing `reasoning` becomes
/// [`DEFAULT_REFINED_REASONING`].
pub fn parse_reply(reply: &str) -> Result<LayoutDecision, RefineError> {
    let object = first_json_object(reply).ok_or(RefineError::NoJsonObject)?;
    let value: serde_json::Value =
        serde_json::from_str(object).map_err(|e| RefineError::MalformedJson(e.to_string()))?;

    let name = value
        .get("layout")
        .and_then(serde_json::Value::as_str)
        .ok_or(RefineError::MissingLayout)?;
    let layout: Layout = name
        .trim()
        .parse()
        .map_err(|_| RefineError::UnknownLayout(name.to_string()))?;

    let reasoning = value
        .get("reasoning")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_REFINED_REASONING);
    let confidence = value
        .get("confidence")
        .and_then(serde_json::Value::as_f64)
        .filter(|c| c.is_finite())
        .unwrap_or(DEFAULT_REFINED_CONFIDENCE);

    Ok(LayoutDecision::new(layout, reasoning, confidence))
}

/// Slice of the first balanced `{...}` in `text`, honouring JSON strings so
/// braces inside `"reasoning"` do not confuse the depth count.
fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}
