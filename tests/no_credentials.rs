//! Loading with no LLM credentials in the environment.
//!
//! Kept in its own test binary because it clears process-wide environment
//! variables that the other integration tests must not observe.
//!
//! Run with:
//!   cargo test --test no_credentials

use md2deck::{load_deck, DecisionSource, DeckConfig, Layout, SourceDocument, BASIC_FALLBACK_REASONING};

/// Every variable `edgequake-llm` consults when auto-detecting a provider.
const PROVIDER_ENV_VARS: &[&str] = &[
    "EDGEQUAKE_LLM_PROVIDER",
    "EDGEQUAKE_MODEL",
    "OLLAMA_HOST",
    "OLLAMA_MODEL",
    "LMSTUDIO_HOST",
    "LMSTUDIO_MODEL",
    "ANTHROPIC_API_KEY",
    "GEMINI_API_KEY",
    "GOOGLE_API_KEY",
    "MISTRAL_API_KEY",
    "AZURE_OPENAI_CONTENTGEN_API_KEY",
    "AZURE_OPENAI_API_KEY",
    "XAI_API_KEY",
    "HF_TOKEN",
    "HUGGINGFACE_TOKEN",
    "OPENROUTER_API_KEY",
    "OPENAI_API_KEY",
];

#[tokio::test]
async fn test_missing_credentials_fall_back_to_heuristics() {
    for var in PROVIDER_ENV_VARS {
        std::env::remove_var(var);
    }

    let text = "One two three four five six seven eight nine ten.\n\n\
Eleven twelve thirteen fourteen fifteen sixteen seventeen eighteen nineteen twenty.";
    let deck = load_deck(vec![SourceDocument::new("01.md", text)], &DeckConfig::default())
        .await
        .expect("missing credentials are never fatal");

    let slide = &deck.slides[0];
    assert_eq!(slide.layout(), Layout::ContentCenter);
    assert_eq!(slide.decision.confidence, 0.5);
    assert_eq!(slide.decision_source, DecisionSource::BasicFallback);
    assert_eq!(slide.justification(), BASIC_FALLBACK_REASONING);
    assert_eq!(deck.stats.refinement_calls, 0);
    assert_eq!(deck.stats.basic_fallbacks, 1);

    let err = md2deck::resolve_generator(&DeckConfig::default())
        .err()
        .expect("no backend without credentials");
    assert!(matches!(err, md2deck::RefineError::Unavailable(_)), "got: {err:?}");
}
