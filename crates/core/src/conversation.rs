//! Conversation types
//!
//! A session is an ordered list of [`Turn`]s. Each turn is driven through the
//! [`DialogueState`] machine and either reaches `Delivered` or stops in `Failed`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::LanguageCode;

/// How the user supplied a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Voice,
}

/// What the user wants from a turn (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    EligibilityCheck,
    ApplicationGuidance,
    FinancialTip,
    /// The user is answering a previously asked question
    SlotFilling,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EligibilityCheck => "eligibility_check",
            Self::ApplicationGuidance => "application_guidance",
            Self::FinancialTip => "financial_tip",
            Self::SlotFilling => "slot_filling",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kinds of failure that abort a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnFailure {
    UnsupportedLanguage,
    TranslationFailure,
    TransliterationFailure,
    SpeechRecognitionFailure,
    SpeechSynthesisFailure,
    AudioTooLong,
    EmptyAudio,
    EmptyInput,
}

impl fmt::Display for TurnFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UnsupportedLanguage => "UnsupportedLanguage",
            Self::TranslationFailure => "TranslationFailure",
            Self::TransliterationFailure => "TransliterationFailure",
            Self::SpeechRecognitionFailure => "SpeechRecognitionFailure",
            Self::SpeechSynthesisFailure => "SpeechSynthesisFailure",
            Self::AudioTooLong => "AudioTooLong",
            Self::EmptyAudio => "EmptyAudio",
            Self::EmptyInput => "EmptyInput",
        };
        f.write_str(name)
    }
}

/// Per-turn dialogue state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "failure", rename_all = "snake_case")]
pub enum DialogueState {
    AwaitingInput,
    Normalizing,
    Routing,
    Composing,
    Localizing,
    Delivered,
    Failed(TurnFailure),
}

impl DialogueState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Failed(_))
    }

    /// Whether the machine may move from `self` to `next`
    pub fn can_transition_to(&self, next: DialogueState) -> bool {
        use DialogueState::*;
        match (self, next) {
            (Delivered | Failed(_), _) => false,
            (_, Failed(_)) => true,
            (AwaitingInput, Normalizing)
            | (Normalizing, Routing)
            | (Routing, Composing)
            | (Composing, Localizing)
            | (Localizing, Delivered) => true,
            _ => false,
        }
    }
}

/// Reference to what the user submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawInput {
    Text { text: String },
    /// Audio is not retained; only its size and duration are recorded
    Audio { bytes: usize, duration_secs: f64 },
}

/// One user utterance and the system's response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub modality: Modality,
    pub raw_input: RawInput,
    /// Fixed once computed; used for both directions of translation
    pub detected_language: LanguageCode,
    /// User input in the pivot language
    pub normalized_text: String,
    pub intent: Intent,
    pub response_english: String,
    /// Response in `detected_language`
    pub response_localized: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            DialogueState::AwaitingInput,
            DialogueState::Normalizing,
            DialogueState::Routing,
            DialogueState::Composing,
            DialogueState::Localizing,
            DialogueState::Delivered,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_failed_reachable_from_any_live_state() {
        let failed = DialogueState::Failed(TurnFailure::TranslationFailure);
        assert!(DialogueState::AwaitingInput.can_transition_to(failed));
        assert!(DialogueState::Localizing.can_transition_to(failed));
        assert!(!DialogueState::Delivered.can_transition_to(failed));
        assert!(!failed.can_transition_to(DialogueState::AwaitingInput));
    }

    #[test]
    fn test_no_skipping_states() {
        assert!(!DialogueState::Normalizing.can_transition_to(DialogueState::Localizing));
        assert!(!DialogueState::Routing.can_transition_to(DialogueState::Delivered));
    }

    #[test]
    fn test_dialogue_state_serde() {
        let json = serde_json::to_value(DialogueState::Failed(TurnFailure::AudioTooLong)).unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["failure"], "AudioTooLong");
    }
}
