//! Integration tests for md2deck deck loading.
//!
//! Every test runs offline. Refinement goes through a scripted
//! `TextGenerator` that counts calls and records the prompts it receives,
//! so the tests can assert exactly when the model would have been asked.
//!
//! Run with:
//!   cargo test --test deck -- --nocapture

use async_trait::async_trait;
use md2deck::{
    classify, load_deck, load_deck_from_inputs, DecisionSource, DeckConfig, DeckError, DeckState,
    GenerationOptions, Layout, RefineError, SourceDocument, TextGenerator,
    BASIC_FALLBACK_REASONING, MANUAL_REASONING,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Replies with a fixed script and remembers every prompt.
struct CountingGenerator {
    reply: Result<String, RefineError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl CountingGenerator {
    fn replying(reply: &str) -> Arc<Self> {
        Self::with(Ok(reply.to_string()), None)
    }

    fn failing() -> Arc<Self> {
        Self::with(
            Err(RefineError::ServiceFailed {
                backend: "counting".into(),
                detail: "503 Service Unavailable".into(),
            }),
            None,
        )
    }

    fn with(reply: Result<String, RefineError>, delay: Option<Duration>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            delay,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for CountingGenerator {
    fn name(&self) -> &str {
        "counting"
    }

    async fn generate(
        &self,
        prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<String, RefineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        self.reply.clone()
    }
}

fn config_with(generator: Arc<CountingGenerator>) -> DeckConfig {
    DeckConfig::builder()
        .generator(generator)
        .build()
        .expect("valid config")
}

fn heuristic_only() -> DeckConfig {
    DeckConfig::builder().refine(false).build().expect("valid config")
}

fn doc(name: &str, text: &str) -> SourceDocument {
    SourceDocument::new(name, text)
}

const TWO_PARAGRAPHS: &str = "One two three four five six seven eight nine ten.\n\n\
Eleven twelve thirteen fourteen fifteen sixteen seventeen eighteen nineteen twenty.";

// ── End-to-end layout selection ──────────────────────────────────────────────

#[tokio::test]
async fn test_title_slide_is_hero_without_refinement() {
    let gen = CountingGenerator::replying(r#"{"layout":"quote"}"#);
    let deck = load_deck(vec![doc("01.md", "# Title")], &config_with(Arc::clone(&gen)))
        .await
        .unwrap();

    let slide = &deck.slides[0];
    assert_eq!(slide.layout(), Layout::Hero);
    assert_eq!(slide.decision.confidence, 0.95);
    assert_eq!(slide.decision_source, DecisionSource::Heuristic);
    assert_eq!(gen.calls(), 0);
    assert_eq!(deck.stats.refinement_calls, 0);
}

#[tokio::test]
async fn test_code_slide_is_code_focus() {
    let text = "```rust\nfn main() {}\n```\n\nThe entry point of every binary.";
    let deck = load_deck(vec![doc("01.md", text)], &heuristic_only())
        .await
        .unwrap();

    let slide = &deck.slides[0];
    assert_eq!(slide.features.code_block_count, 1);
    assert_eq!(slide.features.paragraph_count, 1);
    assert_eq!(slide.layout(), Layout::CodeFocus);
    assert_eq!(slide.decision.confidence, 0.85);
}

#[tokio::test]
async fn test_plain_text_without_backend_is_basic_fallback() {
    let deck = load_deck(
        vec![doc("01.md", "# Intro"), doc("02.md", TWO_PARAGRAPHS)],
        &heuristic_only(),
    )
    .await
    .unwrap();

    let slide = &deck.slides[1];
    assert_eq!(slide.features.paragraph_count, 2);
    assert_eq!(slide.features.total_words, 20);
    assert_eq!(slide.layout(), Layout::ContentCenter);
    assert_eq!(slide.justification(), BASIC_FALLBACK_REASONING);
    assert_eq!(slide.decision_source, DecisionSource::BasicFallback);
    assert_eq!(deck.stats.basic_fallbacks, 2);
}

#[tokio::test]
async fn test_sources_are_sorted_by_name() {
    let deck = load_deck(
        vec![
            doc("slide10.md", "ten"),
            doc("02-b.md", "b"),
            doc("slide2.md", "two"),
            doc("01-a.md", "a"),
        ],
        &heuristic_only(),
    )
    .await
    .unwrap();

    let names: Vec<_> = deck.slides.iter().map(|s| s.source_name.as_str()).collect();
    assert_eq!(names, vec!["01-a.md", "02-b.md", "slide2.md", "slide10.md"]);
    let indices: Vec<_> = deck.slides.iter().map(|s| s.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
}

// ── Confidence gating and fallback ───────────────────────────────────────────

#[tokio::test]
async fn test_only_low_confidence_slides_are_refined() {
    let gen = CountingGenerator::replying(
        r#"{"layout":"content-left","reasoning":"Text after a section.","confidence":0.7}"#,
    );
    let deck = load_deck(
        vec![
            doc("01.md", "# Welcome"),
            doc("02.md", "# Part two"),
            doc("03.md", TWO_PARAGRAPHS),
        ],
        &config_with(Arc::clone(&gen)),
    )
    .await
    .unwrap();

    // hero 0.95 and section-break 0.90 meet the threshold.
    assert_eq!(deck.layouts(), vec![Layout::Hero, Layout::SectionBreak, Layout::ContentLeft]);
    assert_eq!(gen.calls(), 1);
    assert_eq!(deck.slides[2].decision_source, DecisionSource::Refined);
    assert_eq!(deck.slides[2].justification(), "Text after a section.");
    assert_eq!(deck.stats.refined, 1);
    assert_eq!(deck.stats.heuristic, 2);
}

#[tokio::test]
async fn test_threshold_zero_never_refines() {
    let gen = CountingGenerator::replying(r#"{"layout":"quote"}"#);
    let config = DeckConfig::builder()
        .generator(Arc::clone(&gen) as Arc<dyn TextGenerator>)
        .confidence_threshold(0.0)
        .build()
        .unwrap();
    load_deck(vec![doc("01.md", TWO_PARAGRAPHS)], &config).await.unwrap();
    assert_eq!(gen.calls(), 0);
}

async fn assert_falls_back(gen: Arc<CountingGenerator>) {
    let deck = load_deck(
        vec![doc("01.md", "# Intro"), doc("02.md", TWO_PARAGRAPHS)],
        &config_with(Arc::clone(&gen)),
    )
    .await
    .expect("refinement failures are never fatal");

    let slide = &deck.slides[1];
    assert_eq!(gen.calls(), 1);
    assert_eq!(slide.decision, classify(&slide.features, slide.index));
    assert_eq!(slide.decision_source, DecisionSource::RefinementFallback);
    assert_eq!(deck.stats.refinement_fallbacks, 1);
}

#[tokio::test]
async fn test_backend_error_keeps_heuristic() {
    assert_falls_back(CountingGenerator::failing()).await;
}

#[tokio::test]
async fn test_unknown_layout_keeps_heuristic() {
    assert_falls_back(CountingGenerator::replying(
        r#"{"layout":"sidebar","reasoning":"Looks like a sidebar","confidence":0.99}"#,
    ))
    .await;
}

#[tokio::test]
async fn test_unparsable_reply_keeps_heuristic() {
    assert_falls_back(CountingGenerator::replying("I would go with a hero layout here.")).await;
}

#[tokio::test(start_paused = true)]
async fn test_slow_backend_keeps_heuristic() {
    let gen = CountingGenerator::with(
        Ok(r#"{"layout":"quote"}"#.to_string()),
        Some(Duration::from_secs(120)),
    );
    let config = DeckConfig::builder()
        .generator(Arc::clone(&gen) as Arc<dyn TextGenerator>)
        .api_timeout_secs(5)
        .build()
        .unwrap();
    let deck = load_deck(vec![doc("01.md", TWO_PARAGRAPHS)], &config).await.unwrap();

    let slide = &deck.slides[0];
    assert_eq!(slide.decision, classify(&slide.features, 0));
    assert_eq!(slide.decision_source, DecisionSource::RefinementFallback);
}

// ── Previous-layout threading ────────────────────────────────────────────────

#[tokio::test]
async fn test_prompt_carries_previous_chosen_layout() {
    let gen = CountingGenerator::replying(r#"{"layout":"quote","confidence":0.6}"#);
    let deck = load_deck(
        vec![
            doc("01.md", "# Welcome"),
            doc("02.md", TWO_PARAGRAPHS),
            doc("03.md", TWO_PARAGRAPHS),
        ],
        &config_with(Arc::clone(&gen)),
    )
    .await
    .unwrap();

    assert_eq!(deck.layouts(), vec![Layout::Hero, Layout::Quote, Layout::Quote]);
    let prompts = gen.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains("**Previous Layout:** hero"), "{}", prompts[0]);
    // The refined layout of slide 2, not its heuristic guess, feeds slide 3.
    assert!(prompts[1].contains("**Previous Layout:** quote"), "{}", prompts[1]);
    assert!(prompts[1].contains("- Slide number: 3"));
}

// ── Front matter ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_front_matter_layout_overrides_everything() {
    let gen = CountingGenerator::replying(r#"{"layout":"quote"}"#);
    let text = "---\ntitle: Roadmap\nlayout: timeline\ntags: [plan, q3]\n---\n# Roadmap";
    let deck = load_deck(vec![doc("01.md", text)], &config_with(Arc::clone(&gen)))
        .await
        .unwrap();

    let slide = &deck.slides[0];
    assert_eq!(slide.layout(), Layout::Timeline);
    assert_eq!(slide.decision.confidence, 1.0);
    assert_eq!(slide.justification(), MANUAL_REASONING);
    assert_eq!(slide.decision_source, DecisionSource::Manual);
    assert_eq!(slide.content.front_matter.title.as_deref(), Some("Roadmap"));
    assert_eq!(slide.content.front_matter.tags, vec!["plan", "q3"]);
    assert_eq!(slide.content.raw_markdown, "# Roadmap");
    assert!(slide.content.html.contains("<h1>Roadmap</h1>"));
    assert_eq!(gen.calls(), 0);
}

#[tokio::test]
async fn test_unknown_front_matter_layout_is_ignored() {
    let text = "---\nlayout: sidebar\n---\n# Title";
    let deck = load_deck(vec![doc("01.md", text)], &heuristic_only()).await.unwrap();
    assert_eq!(deck.slides[0].layout(), Layout::Hero);
    assert_eq!(deck.slides[0].decision_source, DecisionSource::BasicFallback);
}

#[tokio::test]
async fn test_invalid_front_matter_aborts_whole_load() {
    let result = load_deck(
        vec![
            doc("01.md", "# Fine"),
            doc("02.md", "---\ntitle: [unclosed\n---\nBody"),
            doc("03.md", "Also fine"),
        ],
        &heuristic_only(),
    )
    .await;

    match result {
        Err(DeckError::InvalidFrontMatter { name, .. }) => assert_eq!(name, "02.md"),
        other => panic!("expected InvalidFrontMatter, got {other:?}"),
    }
}

// ── Deck state ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_state_failed_load_clears_previous_deck() {
    let mut state = DeckState::new();
    state
        .load(vec![doc("01.md", "# One"), doc("02.md", "Two")], &heuristic_only())
        .await;
    assert_eq!(state.len(), 2);
    state.next_slide();
    assert_eq!(state.position(), 1);

    state
        .load(vec![doc("01.md", "---\nlayout: [\n---\n")], &heuristic_only())
        .await;
    assert!(state.is_empty());
    assert_eq!(state.position(), 0);
    assert!(!state.is_loading());
    assert!(state.error().unwrap().starts_with("Failed to load slides:"));
}

#[tokio::test]
async fn test_state_navigation_clamps() {
    let mut state = DeckState::new();
    state
        .load(
            vec![doc("01.md", "# A"), doc("02.md", "B"), doc("03.md", "C")],
            &heuristic_only(),
        )
        .await;

    state.previous_slide();
    assert_eq!(state.position(), 0);
    state.go_to_slide(2);
    state.next_slide();
    assert_eq!(state.position(), 2);
    state.go_to_slide(7);
    assert_eq!(state.position(), 2);
    assert_eq!(state.current().unwrap().source_name, "03.md");
}

// ── Input resolution ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_load_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("10-end.md"), "# Thanks").unwrap();
    std::fs::write(dir.path().join("2-code.md"), "```\nls\n```").unwrap();
    std::fs::write(dir.path().join("1-title.md"), "# Talk").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not a slide").unwrap();

    let inputs = vec![dir.path().display().to_string()];
    let deck = load_deck_from_inputs(&inputs, &heuristic_only()).await.unwrap();

    let names: Vec<_> = deck.slides.iter().map(|s| s.source_name.as_str()).collect();
    assert_eq!(names, vec!["1-title.md", "2-code.md", "10-end.md"]);
    assert_eq!(
        deck.layouts(),
        vec![Layout::Hero, Layout::CodeFocus, Layout::SectionBreak]
    );
}

#[tokio::test]
async fn test_missing_input_is_fatal() {
    let inputs = vec!["/no/such/slides/dir".to_string()];
    let err = load_deck_from_inputs(&inputs, &heuristic_only()).await.unwrap_err();
    assert!(matches!(err, DeckError::SourceNotFound { .. }), "got: {err:?}");
}

#[test]
fn test_deck_serialises_to_json() {
    let deck = md2deck::load_deck_sync(&[], &heuristic_only());
    assert!(matches!(deck, Err(DeckError::NoSources { .. })));

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("01.md"), "# Hello").unwrap();
    let deck = md2deck::load_deck_sync(&[dir.path().display().to_string()], &heuristic_only())
        .unwrap();
    let json = serde_json::to_value(&deck).unwrap();
    assert_eq!(json["slides"][0]["decision"]["layout"], "hero");
    assert_eq!(json["slides"][0]["decision_source"], "basic_fallback");
}
