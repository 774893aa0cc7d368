//! LLM integration for tip elaboration
//!
//! Features:
//! - OpenAI-compatible chat completions backend
//! - Ollama chat backend
//! - Adapter from `LlmBackend` to the core `LanguageModel` trait
//! - Factory building the configured backend, or none when disabled
//!
//! The LLM is optional. Every failure surfaces as `Error::LlmUnavailable`
//! and callers fall back to static text.

pub mod adapter;
pub mod backend;
pub mod factory;
pub mod prompt;

pub use adapter::LanguageModelAdapter;
pub use backend::{
    FinishReason, GenerationResult, LlmBackend, LlmConfig, OllamaBackend, OpenAIBackend,
};
pub use factory::create_language_model;
pub use prompt::{Message, PromptBuilder, Role};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for loan_assist_core::Error {
    fn from(err: LlmError) -> Self {
        loan_assist_core::Error::LlmUnavailable(err.to_string())
    }
}
