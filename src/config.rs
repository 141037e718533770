//! Configuration types for deck loading.
//!
//! All loading behaviour is controlled through [`DeckConfig`], built via its
//! [`DeckConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share a config between loads and to log it when a deck looks wrong.

use crate::error::DeckError;
use crate::generator::{GenerationOptions, TextGenerator};
use crate::pipeline::heuristic::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Model used when a provider is named without a model.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Configuration for turning Markdown sources into a deck.
///
/// Built via [`DeckConfig::builder()`] or using [`DeckConfig::default()`].
///
/// # Example
/// ```rust
/// use md2deck::DeckConfig;
///
/// let config = DeckConfig::builder()
///     .confidence_threshold(0.85)
///     .temperature(0.2)
///     .debug(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct DeckConfig {
    /// Pre-constructed refinement backend. Takes precedence over every provider setting.
    pub generator: Option<Arc<dyn TextGenerator>>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// LLM provider name (e.g. "anthropic", "openai", "ollama").
    pub provider_name: Option<String>,

    /// LLM model identifier. If None, [`DEFAULT_MODEL`] is used for named providers.
    pub model: Option<String>,

    /// Whether low-confidence slides are sent to the LLM at all. Default: true.
    ///
    /// When false every slide is classified by the heuristic alone, exactly
    /// as if no credential were configured.
    pub refine: bool,

    /// Heuristic confidence at or above which refinement is skipped. Default: 0.90.
    pub confidence_threshold: f64,

    /// Sampling temperature for refinement. Default: 0.3.
    ///
    /// Low enough that the same slide gets the same answer run to run.
    pub temperature: f32,

    /// Maximum tokens in a refinement reply. Default: 500.
    ///
    /// The reply is a three-field JSON object; 500 leaves room for models
    /// that wrap it in prose.
    pub max_tokens: usize,

    /// Characters of slide body included in the prompt. Default: 500.
    pub excerpt_chars: usize,

    /// Per-refinement-call timeout in seconds. Default: 30.
    ///
    /// A call that does not answer in time is treated like any other
    /// refinement failure: the heuristic decision is kept.
    pub api_timeout_secs: u64,

    /// Download timeout for URL sources in seconds. Default: 60.
    pub download_timeout_secs: u64,

    /// Maximum URL sources downloaded at once. Default: 4.
    pub download_concurrency: usize,

    /// Log every layout decision at INFO instead of DEBUG. Default: false.
    pub debug: bool,

    /// Per-slide progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            generator: None,
            provider: None,
            provider_name: None,
            model: None,
            refine: true,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            temperature: 0.3,
            max_tokens: 500,
            excerpt_chars: 500,
            api_timeout_secs: 30,
            download_timeout_secs: 60,
            download_concurrency: 4,
            debug: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for DeckConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeckConfig")
            .field("generator", &self.generator.as_ref().map(|g| g.name().to_string()))
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("refine", &self.refine)
            .field("confidence_threshold", &self.confidence_threshold)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("excerpt_chars", &self.excerpt_chars)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("download_concurrency", &self.download_concurrency)
            .field("debug", &self.debug)
            .finish()
    }
}

impl DeckConfig {
    /// Create a new builder for `DeckConfig`.
    pub fn builder() -> DeckConfigBuilder {
        DeckConfigBuilder {
            config: Self::default(),
        }
    }

    pub(crate) fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// Builder for [`DeckConfig`].
pub struct DeckConfigBuilder {
    config: DeckConfig,
}

impl fmt::Debug for DeckConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeckConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl DeckConfigBuilder {
    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.config.generator = Some(generator);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn refine(mut self, v: bool) -> Self {
        self.config.refine = v;
        self
    }

    pub fn confidence_threshold(mut self, t: f64) -> Self {
        self.config.confidence_threshold = t;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n.max(1);
        self
    }

    pub fn excerpt_chars(mut self, n: usize) -> Self {
        self.config.excerpt_chars = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn download_concurrency(mut self, n: usize) -> Self {
        self.config.download_concurrency = n.max(1);
        self
    }

    pub fn debug(mut self, v: bool) -> Self {
        self.config.debug = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<DeckConfig, DeckError> {
        let c = &self.config;
        if !(0.0..=1.0).contains(&c.confidence_threshold) {
            return Err(DeckError::InvalidConfig(format!(
                "Confidence threshold must be 0.0–1.0, got {}",
                c.confidence_threshold
            )));
        }
        if c.api_timeout_secs == 0 {
            return Err(DeckError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
