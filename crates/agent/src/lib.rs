//! Loan advisor dialogue
//!
//! Features:
//! - Conversation state with slot filling over a closed set of profile fields
//! - Response composition (questions, verdicts, application steps, tips)
//! - Per-turn state machine with staged commits
//! - Session registry with per-session serialization and JSON persistence

pub mod assistant;
pub mod composer;
pub mod orchestrator;
pub mod session;
pub mod state;

pub use assistant::LoanAssistant;
pub use composer::{apology, question_for, Composition, ResponseComposer};
pub use orchestrator::{
    DeliveredTurn, DialogueOrchestrator, FailedTurn, TurnInput, TurnOutcome, TurnRequest,
};
pub use session::{Session, SessionSummary};
pub use state::ConversationState;

use thiserror::Error;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Session limit reached ({0})")]
    SessionLimit(usize),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<loan_assist_pipeline::PipelineError> for AgentError {
    fn from(err: loan_assist_pipeline::PipelineError) -> Self {
        match err {
            loan_assist_pipeline::PipelineError::Configuration(msg) => {
                AgentError::Configuration(msg)
            }
            other => AgentError::Pipeline(other.to_string()),
        }
    }
}

impl From<loan_assist_llm::LlmError> for AgentError {
    fn from(err: loan_assist_llm::LlmError) -> Self {
        AgentError::Llm(err.to_string())
    }
}

impl From<loan_assist_config::ConfigError> for AgentError {
    fn from(err: loan_assist_config::ConfigError) -> Self {
        AgentError::Configuration(err.to_string())
    }
}
