//! Language Model trait

use async_trait::async_trait;

use crate::Result;

/// Text-in / text-out completion.
///
/// Implementations:
/// - `LanguageModelAdapter` - wraps an OpenAI-compatible or Ollama backend
///
/// Used only to elaborate financial tips. Callers treat every error as
/// `Error::LlmUnavailable` and fall back to static content.
///
/// # Example
///
/// ```ignore
/// let llm: Arc<dyn LanguageModel> = Arc::new(LanguageModelAdapter::new(backend));
/// let text = llm.complete("Explain why paying bills on time helps a credit score").await?;
/// ```
#[async_trait]
pub trait LanguageModel: Send + Sync + 'static {
    /// Complete a prompt
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}
