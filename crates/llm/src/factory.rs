//! LLM factory
//!
//! Builds the configured backend as a `LanguageModel`. A disabled LLM yields
//! `None`; the dialogue then serves static tips only.

use std::sync::Arc;
use std::time::Duration;

use loan_assist_config::{LlmProvider, LlmSettings};
use loan_assist_core::LanguageModel;

use crate::adapter::LanguageModelAdapter;
use crate::backend::{LlmBackend, LlmConfig, OllamaBackend, OpenAIBackend};
use crate::LlmError;

const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

fn backend_config(settings: &LlmSettings) -> LlmConfig {
    let api_key = settings
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| match settings.provider {
            LlmProvider::OpenAi => std::env::var(OPENAI_KEY_ENV).ok(),
            LlmProvider::Ollama => None,
        });

    LlmConfig {
        model: settings.model.clone(),
        endpoint: settings.endpoint_or_default().to_string(),
        api_key,
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
        timeout: Duration::from_millis(settings.timeout_ms),
    }
}

/// Create the language model described by `settings`
pub fn create_language_model(
    settings: &LlmSettings,
) -> Result<Option<Arc<dyn LanguageModel>>, LlmError> {
    if !settings.enabled {
        tracing::info!("LLM disabled; tips use static text");
        return Ok(None);
    }

    let config = backend_config(settings);
    let timeout = config.timeout;
    let backend: Arc<dyn LlmBackend> = match settings.provider {
        LlmProvider::OpenAi => Arc::new(OpenAIBackend::new(config)?),
        LlmProvider::Ollama => Arc::new(OllamaBackend::new(config)?),
    };

    tracing::info!(
        provider = ?settings.provider,
        model = %backend.model_name(),
        endpoint = %settings.endpoint_or_default(),
        "LLM backend ready"
    );
    Ok(Some(Arc::new(LanguageModelAdapter::from_arc(backend, timeout))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_yields_none() {
        let settings = LlmSettings::default();
        assert!(!settings.enabled);
        assert!(create_language_model(&settings).unwrap().is_none());
    }

    #[test]
    fn test_ollama_enabled() {
        let settings = LlmSettings {
            enabled: true,
            provider: LlmProvider::Ollama,
            model: "qwen2.5:3b".to_string(),
            ..Default::default()
        };
        let llm = create_language_model(&settings).unwrap().unwrap();
        assert_eq!(llm.model_name(), "qwen2.5:3b");
    }

    #[test]
    fn test_explicit_key_wins() {
        let settings = LlmSettings {
            enabled: true,
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        assert_eq!(backend_config(&settings).api_key.as_deref(), Some("sk-test"));
        assert!(create_language_model(&settings).unwrap().is_some());
    }
}
