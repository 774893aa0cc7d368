//! Language Model adapter
//!
//! Bridges the LlmBackend trait to the core LanguageModel trait.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use loan_assist_core::{Error, LanguageModel, Result};

use crate::backend::LlmBackend;
use crate::prompt::PromptBuilder;

/// Wraps an LlmBackend as a `LanguageModel`.
///
/// Each `complete` call sends the advisor persona plus the prompt, bounded by
/// `timeout`. Errors, timeouts and empty completions all map to
/// `Error::LlmUnavailable`.
pub struct LanguageModelAdapter {
    backend: Arc<dyn LlmBackend>,
    model_name: String,
    timeout: Duration,
}

impl LanguageModelAdapter {
    pub fn new<B: LlmBackend + 'static>(backend: B, timeout: Duration) -> Self {
        Self::from_arc(Arc::new(backend), timeout)
    }

    pub fn from_arc(backend: Arc<dyn LlmBackend>, timeout: Duration) -> Self {
        let model_name = backend.model_name().to_string();
        Self {
            backend,
            model_name,
            timeout,
        }
    }
}

#[async_trait]
impl LanguageModel for LanguageModelAdapter {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let messages = PromptBuilder::advisor().user(prompt).build();

        let result = tokio::time::timeout(self.timeout, self.backend.generate(&messages))
            .await
            .map_err(|_| {
                Error::LlmUnavailable(format!("timed out after {} ms", self.timeout.as_millis()))
            })??;

        let text = result.text.trim();
        if text.is_empty() {
            return Err(Error::LlmUnavailable("empty completion".to_string()));
        }

        tracing::debug!(
            model = %self.model_name,
            tokens = result.tokens,
            total_time_ms = result.total_time_ms,
            "LLM completion"
        );
        Ok(text.to_string())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
