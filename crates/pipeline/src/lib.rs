//! Language pipeline for the loan advisor
//!
//! Features:
//! - `LanguageService`: validated, time-bounded access to the single language authority
//! - `AudioGate`: admission policy for recorded speech (duration ceiling, empty audio)
//! - `SarvamClient`: Sarvam AI implementation of `LanguageAuthority`
//! - `ScriptedAuthority`: deterministic in-process authority (feature `test-util`)

pub mod audio_gate;
pub mod language_service;
pub mod sarvam;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use audio_gate::{measure_wav_duration, Admission, AdmittedAudio, AudioGate, RejectionReason};
pub use language_service::{LanguageOperation, LanguageService};
pub use sarvam::{chunk_text, concat_wav, voice_for, SarvamClient, SarvamConfig};

#[cfg(any(test, feature = "test-util"))]
pub use testing::ScriptedAuthority;

/// Pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Timeout")]
    Timeout,
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PipelineError::Timeout
        } else {
            PipelineError::Network(err.to_string())
        }
    }
}

impl From<hound::Error> for PipelineError {
    fn from(err: hound::Error) -> Self {
        PipelineError::Audio(err.to_string())
    }
}

impl From<loan_assist_config::ConfigError> for PipelineError {
    fn from(err: loan_assist_config::ConfigError) -> Self {
        PipelineError::Configuration(err.to_string())
    }
}

impl PipelineError {
    /// Convert into the core error for the operation that failed.
    ///
    /// Vendor failures carry no operation of their own, so the caller names it.
    pub fn into_core(self, operation: LanguageOperation) -> loan_assist_core::Error {
        match self {
            PipelineError::Configuration(msg) => loan_assist_core::Error::Configuration(msg),
            other => operation.failure(other.to_string()),
        }
    }
}
