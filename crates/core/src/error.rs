//! Error types shared across the workspace

use thiserror::Error;

use crate::conversation::TurnFailure;

/// Core error type
///
/// Language-service and audio-gate variants abort the current turn and map to a
/// [`TurnFailure`] kind. `LlmUnavailable` and `PersistenceUnavailable` are always
/// recovered where they occur.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Translation failed: {0}")]
    Translation(String),

    #[error("Transliteration failed: {0}")]
    Transliteration(String),

    #[error("Speech recognition failed: {0}")]
    SpeechRecognition(String),

    #[error("Speech synthesis failed: {0}")]
    SpeechSynthesis(String),

    #[error("Audio too long: {duration_secs:.2}s exceeds {max_secs:.0}s")]
    AudioTooLong { duration_secs: f64, max_secs: f64 },

    #[error("Audio is empty")]
    EmptyAudio,

    #[error("Input is empty")]
    EmptyInput,

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Turn failure kind for errors that abort a turn
    pub fn failure_kind(&self) -> Option<TurnFailure> {
        match self {
            Self::UnsupportedLanguage(_) => Some(TurnFailure::UnsupportedLanguage),
            Self::Translation(_) => Some(TurnFailure::TranslationFailure),
            Self::Transliteration(_) => Some(TurnFailure::TransliterationFailure),
            Self::SpeechRecognition(_) => Some(TurnFailure::SpeechRecognitionFailure),
            Self::SpeechSynthesis(_) => Some(TurnFailure::SpeechSynthesisFailure),
            Self::AudioTooLong { .. } => Some(TurnFailure::AudioTooLong),
            Self::EmptyAudio => Some(TurnFailure::EmptyAudio),
            Self::EmptyInput => Some(TurnFailure::EmptyInput),
            Self::LlmUnavailable(_)
            | Self::PersistenceUnavailable(_)
            | Self::Configuration(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kind_mapping() {
        assert_eq!(
            Error::Translation("boom".into()).failure_kind(),
            Some(TurnFailure::TranslationFailure)
        );
        assert_eq!(
            Error::AudioTooLong { duration_secs: 31.0, max_secs: 30.0 }.failure_kind(),
            Some(TurnFailure::AudioTooLong)
        );
        assert_eq!(Error::LlmUnavailable("down".into()).failure_kind(), None);
        assert_eq!(Error::PersistenceUnavailable("ro".into()).failure_kind(), None);
    }

    #[test]
    fn test_audio_too_long_message() {
        let err = Error::AudioTooLong { duration_secs: 30.01, max_secs: 30.0 };
        assert_eq!(err.to_string(), "Audio too long: 30.01s exceeds 30s");
    }
}
