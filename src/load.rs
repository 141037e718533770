//! Deck loading entry points.
//!
//! Loading is all-or-nothing: every slide is built in memory and the deck is
//! returned only once the last one succeeds. Any fatal error discards the
//! slides built so far, so callers never see a half-built deck.
//!
//! Slides are processed strictly in order because each layout decision
//! takes the previous slide's chosen layout into account.

use crate::config::{DeckConfig, DEFAULT_MODEL};
use crate::error::{DeckError, RefineError};
use crate::generator::{ProviderGenerator, TextGenerator};
use crate::layout::{DecisionSource, Layout, LayoutDecision};
use crate::output::{Deck, DeckStats, ParsedContent, SlideRecord};
use crate::pipeline::analyze::{analyze, FeatureVector};
use crate::pipeline::frontmatter;
use crate::pipeline::heuristic::classify;
use crate::pipeline::input::{self, SourceDocument};
use crate::pipeline::refine::{LayoutAdvisor, RefineRequest, Refinement};
use crate::pipeline::render::render_html;
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Justification attached to every slide when no refinement backend exists.
pub const BASIC_FALLBACK_REASONING: &str = "Basic heuristic fallback (refinement unavailable)";

/// Justification for a layout taken from front matter.
pub const MANUAL_REASONING: &str = "Manually specified in front matter";

/// Build a deck from in-memory sources.
///
/// Sources are sorted by natural order of their names first, so the same
/// set of documents always yields the same deck regardless of input order.
///
/// # Errors
/// Returns `Err(DeckError)` for fatal errors only (invalid front matter).
/// Refinement failures never surface here; they fall back per slide.
pub async fn load_deck(
    mut sources: Vec<SourceDocument>,
    config: &DeckConfig,
) -> Result<Deck, DeckError> {
    let start = Instant::now();
    input::sort_sources(&mut sources);
    let total = sources.len();
    info!("Loading deck of {} slides", total);

    let advisor = resolve_advisor(config);

    if let Some(ref cb) = config.progress_callback {
        cb.on_load_start(total);
    }

    let mut slides = Vec::with_capacity(total);
    let mut stats = DeckStats::default();
    let mut previous: Option<Layout> = None;

    for (index, source) in sources.into_iter().enumerate() {
        if let Some(ref cb) = config.progress_callback {
            cb.on_slide_start(index, total);
        }

        let slide = build_slide(source, index, previous, advisor.as_ref(), config).await?;
        log_decision(&slide, config.debug);

        if let Some(ref cb) = config.progress_callback {
            cb.on_slide_complete(index, total, slide.layout(), slide.decision_source);
        }

        stats.record(slide.decision_source);
        previous = Some(slide.layout());
        slides.push(slide);
    }

    stats.total_duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Deck loaded: {} slides ({} refined, {} fallbacks) in {}ms",
        stats.total_slides, stats.refined, stats.refinement_fallbacks, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_load_complete(total, stats.refined);
    }

    Ok(Deck { slides, stats })
}

/// Resolve files, directories, and URLs, then build the deck.
pub async fn load_deck_from_inputs(
    inputs: &[String],
    config: &DeckConfig,
) -> Result<Deck, DeckError> {
    let sources = input::resolve_sources(
        inputs,
        config.download_timeout_secs,
        config.download_concurrency,
    )
    .await?;
    load_deck(sources, config).await
}

/// Synchronous wrapper around [`load_deck_from_inputs`].
///
/// Creates a temporary tokio runtime internally.
pub fn load_deck_sync(inputs: &[String], config: &DeckConfig) -> Result<Deck, DeckError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| DeckError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(load_deck_from_inputs(inputs, config))
}

/// Write a deck as pretty JSON.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn save_deck(deck: &Deck, output_path: impl AsRef<Path>) -> Result<(), DeckError> {
    let path = output_path.as_ref();
    let write_err = |source| DeckError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_string_pretty(deck)
        .map_err(|e| DeckError::Internal(format!("Failed to serialise deck: {e}")))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, json).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}

/// Run the heuristic and, below the confidence threshold, the advisor.
///
/// Returns the chosen decision and how it was reached. With no advisor the
/// heuristic layout is kept and the justification marks basic fallback.
pub async fn select_layout(
    features: &FeatureVector,
    content: &str,
    previous: Option<Layout>,
    position: usize,
    advisor: Option<&LayoutAdvisor>,
    threshold: f64,
) -> (LayoutDecision, DecisionSource) {
    let heuristic = classify(features, position);

    let Some(advisor) = advisor else {
        let decision = LayoutDecision {
            reasoning: BASIC_FALLBACK_REASONING.to_string(),
            ..heuristic
        };
        return (decision, DecisionSource::BasicFallback);
    };

    if heuristic.confidence >= threshold {
        return (heuristic, DecisionSource::Heuristic);
    }

    let request = RefineRequest {
        features,
        content,
        previous_layout: previous,
        position,
    };
    match advisor.refine(&request, &heuristic).await {
        Refinement::Refined(decision) => (decision, DecisionSource::Refined),
        Refinement::FellBack { decision, .. } => (decision, DecisionSource::RefinementFallback),
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn build_slide(
    source: SourceDocument,
    index: usize,
    previous: Option<Layout>,
    advisor: Option<&LayoutAdvisor>,
    config: &DeckConfig,
) -> Result<SlideRecord, DeckError> {
    let split = frontmatter::split(&source.text);
    let front_matter = match split.yaml {
        Some(yaml) => frontmatter::parse(yaml).map_err(|e| DeckError::InvalidFrontMatter {
            name: source.name.clone(),
            detail: e.to_string(),
        })?,
        None => frontmatter::FrontMatter::default(),
    };
    let raw_markdown = split.body.to_string();
    let html = render_html(&raw_markdown);
    let features = analyze(&raw_markdown);

    let (decision, decision_source) = match manual_layout(&front_matter, &source.name) {
        Some(layout) => (
            LayoutDecision::new(layout, MANUAL_REASONING, 1.0),
            DecisionSource::Manual,
        ),
        None => {
            select_layout(
                &features,
                &raw_markdown,
                previous,
                index,
                advisor,
                config.confidence_threshold,
            )
            .await
        }
    };

    Ok(SlideRecord {
        id: Uuid::new_v4(),
        source_name: source.name,
        content: ParsedContent {
            front_matter,
            raw_markdown,
            html,
        },
        features,
        decision,
        decision_source,
        index,
    })
}

/// The front-matter override, if it names a known layout.
fn manual_layout(front_matter: &frontmatter::FrontMatter, source_name: &str) -> Option<Layout> {
    let raw = front_matter.layout.as_deref()?.trim();
    match raw.parse::<Layout>() {
        Ok(layout) => Some(layout),
        Err(e) => {
            warn!("{}: ignoring front-matter override — {}", source_name, e);
            None
        }
    }
}

fn log_decision(slide: &SlideRecord, verbose: bool) {
    if verbose {
        info!(
            "Slide {} ({}): {} [{}] {:.2} — {}",
            slide.index + 1,
            slide.source_name,
            slide.layout(),
            slide.decision_source,
            slide.decision.confidence,
            slide.justification()
        );
    } else {
        debug!(
            "Slide {} ({}): {} [{}] {:.2}",
            slide.index + 1,
            slide.source_name,
            slide.layout(),
            slide.decision_source,
            slide.decision.confidence
        );
    }
}

/// Build the refinement advisor, or `None` for heuristic-only mode.
///
/// A missing credential is not an error: the deck still loads, every slide
/// gets the heuristic layout, and the reason is logged once here.
fn resolve_advisor(config: &DeckConfig) -> Option<LayoutAdvisor> {
    if !config.refine {
        info!("Layout refinement disabled; using heuristics only");
        return None;
    }
    match resolve_generator(config) {
        Ok(generator) => {
            let advisor = LayoutAdvisor::new(generator, config);
            debug!("Layout refinement via '{}'", advisor.backend_name());
            Some(advisor)
        }
        Err(reason) => {
            info!("{}; using heuristics only", reason);
            None
        }
    }
}

/// Resolve the refinement backend, from most-specific to least-specific.
///
/// 1. **Pre-built generator** (`config.generator`), used as-is.
/// 2. **Pre-built provider** (`config.provider`), wrapped in a [`ProviderGenerator`].
/// 3. **Named provider + model** (`config.provider_name`), created through
///    [`ProviderFactory::create_llm_provider`], which reads the matching API
///    key from the environment.
/// 4. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).
/// 5. **`ANTHROPIC_API_KEY`** present → Anthropic with the configured or
///    default model.
/// 6. **Full auto-detection** (`ProviderFactory::from_env`).
pub fn resolve_generator(config: &DeckConfig) -> Result<Arc<dyn TextGenerator>, RefineError> {
    if let Some(ref generator) = config.generator {
        return Ok(Arc::clone(generator));
    }

    if let Some(ref provider) = config.provider {
        return Ok(wrap(Arc::clone(provider), "provider"));
    }

    let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);

    if let Some(ref name) = config.provider_name {
        return create_provider(name, model).map(|p| wrap(p, name));
    }

    if let (Ok(prov), Ok(env_model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !env_model.is_empty() {
            return create_provider(&prov, &env_model).map(|p| wrap(p, &prov));
        }
    }

    if std::env::var("ANTHROPIC_API_KEY").is_ok_and(|k| !k.is_empty()) {
        return create_provider("anthropic", model).map(|p| wrap(p, "anthropic"));
    }

    let (llm_provider, _embedding) = ProviderFactory::from_env()
        .map_err(|e| RefineError::Unavailable(format!("no LLM provider configured: {e}")))?;
    // from_env falls back to the canned mock provider when nothing is configured.
    if llm_provider.name() == MOCK_PROVIDER {
        return Err(RefineError::Unavailable(
            "no LLM provider configured".to_string(),
        ));
    }
    Ok(wrap(llm_provider, "auto"))
}

/// Name reported by `edgequake-llm`'s placeholder provider.
const MOCK_PROVIDER: &str = "mock";

fn create_provider(name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, RefineError> {
    ProviderFactory::create_llm_provider(name, model)
        .map_err(|e| RefineError::Unavailable(format!("provider '{name}' not configured: {e}")))
}

fn wrap(provider: Arc<dyn LLMProvider>, label: &str) -> Arc<dyn TextGenerator> {
    Arc::new(ProviderGenerator::new(provider, label))
}
