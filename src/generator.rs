//! Text-generation backend used by the refinement advisor.
//!
//! The advisor only needs "prompt in, text out", so it talks to a narrow
//! [`TextGenerator`] trait instead of the full provider API. The production
//! implementation, [`ProviderGenerator`], adapts any `edgequake-llm`
//! [`LLMProvider`]; tests substitute a scripted generator and count calls.

use crate::error::RefineError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use tracing::debug;

/// Sampling knobs for a single generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: usize,
}

/// Anything that can turn a prompt into free text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short label used in logs and error messages.
    fn name(&self) -> &str;

    /// Send one prompt and return the raw reply text.
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, RefineError>;
}

/// [`TextGenerator`] backed by an `edgequake-llm` chat provider.
pub struct ProviderGenerator {
    provider: Arc<dyn LLMProvider>,
    label: String,
}

impl ProviderGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>, label: impl Into<String>) -> Self {
        Self {
            provider,
            label: label.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for ProviderGenerator {
    fn name(&self) -> &str {
        &self.label
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, RefineError> {
        let messages = vec![ChatMessage::user(prompt)];
        let completion = CompletionOptions {
            temperature: Some(options.temperature),
            max_tokens: Some(options.max_tokens),
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&completion))
            .await
            .map_err(|e| RefineError::ServiceFailed {
                backend: self.label.clone(),
                detail: e.to_string(),
            })?;

        debug!(
            "{}: {} input tokens, {} output tokens",
            self.label, response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content)
    }
}
