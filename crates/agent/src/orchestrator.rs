//! Per-turn dialogue state machine
//!
//! ```text
//! AwaitingInput -> Normalizing -> Routing -> Composing -> Localizing -> Delivered
//!        \______________\______________\___________\____________\-> Failed(kind)
//! ```
//!
//! The input language is detected once, in `Normalizing`, and the same code
//! is the localization target. Conversation changes are staged on a copy of
//! the session state and committed only on `Delivered`; a failed turn leaves
//! the session exactly as it was.

use chrono::Utc;

use loan_assist_core::{
    DialogueState, EligibilityVerdict, Error, Intent, LanguageCode, Modality, ProfileField,
    RawInput, Turn, TurnFailure,
};
use loan_assist_pipeline::{Admission, AudioGate, LanguageService};
use loan_assist_text_processing::{IntentRouter, SlotExtractor};

use crate::composer::{apology, ResponseComposer};
use crate::session::Session;

/// User input for one turn
#[derive(Debug, Clone, PartialEq)]
pub enum TurnInput {
    Text(String),
    Voice {
        bytes: Vec<u8>,
        /// Duration reported by the client, cross-checked against the WAV header
        declared_duration_secs: Option<f64>,
    },
}

impl TurnInput {
    pub fn modality(&self) -> Modality {
        match self {
            TurnInput::Text(_) => Modality::Text,
            TurnInput::Voice { .. } => Modality::Voice,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurnRequest {
    pub input: TurnInput,
    /// UI label language, recorded on the session only
    pub display_language: Option<LanguageCode>,
    /// Also synthesize the response as speech
    pub synthesize: bool,
}

impl TurnRequest {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            input: TurnInput::Text(text.into()),
            display_language: None,
            synthesize: false,
        }
    }

    pub fn voice(bytes: Vec<u8>, declared_duration_secs: Option<f64>) -> Self {
        Self {
            input: TurnInput::Voice {
                bytes,
                declared_duration_secs,
            },
            display_language: None,
            synthesize: false,
        }
    }

    pub fn with_display_language(mut self, language: LanguageCode) -> Self {
        self.display_language = Some(language);
        self
    }

    pub fn with_speech(mut self) -> Self {
        self.synthesize = true;
        self
    }
}

/// A delivered response
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveredTurn {
    /// Response in the detected language and its native script
    pub response_text: String,
    pub response_english: String,
    /// WAV bytes, when speech was requested
    pub response_audio: Option<Vec<u8>>,
    pub detected_language: LanguageCode,
    pub intent: Intent,
    pub verdict: Option<EligibilityVerdict>,
    /// Profile fields still unset after this turn
    pub missing_fields: Vec<ProfileField>,
}

/// A turn that failed; nothing was committed
#[derive(Debug, Clone, PartialEq)]
pub struct FailedTurn {
    pub failure: TurnFailure,
    /// Localized when the language was known and localization succeeded
    pub apology: String,
    pub detected_language: Option<LanguageCode>,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// Every state visited, in order, ending in `Delivered` or `Failed`
    pub states: Vec<DialogueState>,
    pub result: Result<DeliveredTurn, FailedTurn>,
}

impl TurnOutcome {
    pub fn final_state(&self) -> DialogueState {
        self.states
            .last()
            .copied()
            .unwrap_or(DialogueState::AwaitingInput)
    }

    pub fn is_delivered(&self) -> bool {
        self.result.is_ok()
    }
}

/// Records visited states and logs each transition
struct Transitions<'a> {
    session_id: &'a str,
    states: Vec<DialogueState>,
}

impl<'a> Transitions<'a> {
    fn new(session_id: &'a str) -> Self {
        Self {
            session_id,
            states: vec![DialogueState::AwaitingInput],
        }
    }

    fn current(&self) -> DialogueState {
        self.states
            .last()
            .copied()
            .unwrap_or(DialogueState::AwaitingInput)
    }

    fn advance(&mut self, next: DialogueState) {
        let current = self.current();
        debug_assert!(
            current.can_transition_to(next),
            "invalid transition {:?} -> {:?}",
            current,
            next
        );
        tracing::debug!(session_id = %self.session_id, from = ?current, to = ?next, "Dialogue transition");
        self.states.push(next);
    }
}

/// Everything a turn produced before localization
struct Staged {
    raw_input: RawInput,
    language: LanguageCode,
    normalized: String,
    intent: Intent,
    response_english: String,
    verdict: Option<EligibilityVerdict>,
    state: crate::state::ConversationState,
}

pub struct DialogueOrchestrator {
    language: LanguageService,
    gate: AudioGate,
    router: IntentRouter,
    extractor: SlotExtractor,
    composer: ResponseComposer,
}

impl DialogueOrchestrator {
    pub fn new(language: LanguageService, gate: AudioGate, composer: ResponseComposer) -> Self {
        Self {
            language,
            gate,
            router: IntentRouter::new(),
            extractor: SlotExtractor::new(),
            composer,
        }
    }

    pub fn language_service(&self) -> &LanguageService {
        &self.language
    }

    pub fn audio_gate(&self) -> &AudioGate {
        &self.gate
    }

    /// Run one turn against `session`.
    ///
    /// The session is modified only when the turn is delivered.
    pub async fn run_turn(&self, session: &mut Session, request: TurnRequest) -> TurnOutcome {
        let session_id = session.id.clone();
        let mut transitions = Transitions::new(&session_id);
        let modality = request.input.modality();
        let mut detected: Option<LanguageCode> = None;

        let result = self
            .drive(session, &request, &mut transitions, &mut detected)
            .await;

        match result {
            Ok((staged, response_text, response_audio)) => {
                transitions.advance(DialogueState::Delivered);

                let missing_fields = staged.state.missing_fields();
                let delivered = DeliveredTurn {
                    response_text: response_text.clone(),
                    response_english: staged.response_english.clone(),
                    response_audio,
                    detected_language: staged.language,
                    intent: staged.intent,
                    verdict: staged.verdict,
                    missing_fields,
                };

                let now = Utc::now();
                session.turns.push(Turn {
                    modality,
                    raw_input: staged.raw_input,
                    detected_language: staged.language,
                    normalized_text: staged.normalized,
                    intent: staged.intent,
                    response_english: staged.response_english,
                    response_localized: response_text,
                    timestamp: now,
                });
                session.state = staged.state;
                session.detected_language = Some(staged.language);
                if request.display_language.is_some() {
                    session.display_language = request.display_language;
                }
                session.updated_at = now;

                tracing::info!(
                    session_id = %session_id,
                    language = %delivered.detected_language,
                    intent = %delivered.intent,
                    missing = delivered.missing_fields.len(),
                    "Turn delivered"
                );

                TurnOutcome {
                    states: transitions.states,
                    result: Ok(delivered),
                }
            }
            Err((failure, error)) => {
                transitions.advance(DialogueState::Failed(failure));
                tracing::warn!(
                    session_id = %session_id,
                    failure = %failure,
                    error = %error,
                    "Turn failed"
                );

                let apology = self.apology(failure, detected).await;
                TurnOutcome {
                    states: transitions.states,
                    result: Err(FailedTurn {
                        failure,
                        apology,
                        detected_language: detected,
                        error: error.to_string(),
                    }),
                }
            }
        }
    }

    async fn drive(
        &self,
        session: &Session,
        request: &TurnRequest,
        transitions: &mut Transitions<'_>,
        detected: &mut Option<LanguageCode>,
    ) -> Result<(Staged, String, Option<Vec<u8>>), (TurnFailure, Error)> {
        // Normalizing
        transitions.advance(DialogueState::Normalizing);
        let (raw_input, language, source_text) = match &request.input {
            TurnInput::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(fail(Error::EmptyInput, TurnFailure::EmptyInput));
                }
                let language = self
                    .language
                    .detect(text)
                    .await
                    .map_err(|e| fail(e, TurnFailure::TranslationFailure))?;
                (
                    RawInput::Text {
                        text: text.to_string(),
                    },
                    language,
                    text.to_string(),
                )
            }
            TurnInput::Voice {
                bytes,
                declared_duration_secs,
            } => {
                let admitted = match self.gate.admit(bytes.clone(), *declared_duration_secs) {
                    Admission::Accepted(admitted) => admitted,
                    Admission::Rejected(reason) => {
                        let err: Error = reason.into();
                        let kind = err.failure_kind().unwrap_or(TurnFailure::EmptyAudio);
                        return Err((kind, err));
                    }
                };
                let transcript = self
                    .language
                    .speech_to_text(&admitted)
                    .await
                    .map_err(|e| fail(e, TurnFailure::SpeechRecognitionFailure))?;
                (
                    RawInput::Audio {
                        bytes: bytes.len(),
                        duration_secs: admitted.duration_secs(),
                    },
                    transcript.language,
                    transcript.text,
                )
            }
        };
        *detected = Some(language);

        let normalized = self
            .language
            .normalize(&source_text, language)
            .await
            .map_err(|e| fail(e, TurnFailure::TranslationFailure))?;

        // Routing
        transitions.advance(DialogueState::Routing);
        let mut state = session.state.clone();
        let outstanding = state.outstanding();
        let extracted = self.extractor.extract(&normalized, outstanding);
        let mut newly_set = state.update(&extracted);
        let named = match outstanding {
            Some(ProfileField::LoanType) => extracted.loan_type,
            _ => self.extractor.named_loan_type(&normalized),
        };
        if let Some(named) = named {
            if state.switch_loan_type(named) && !newly_set.contains(&ProfileField::LoanType) {
                newly_set.push(ProfileField::LoanType);
            }
        }
        let intent = self
            .router
            .route_with_profile(&normalized, outstanding, &newly_set);
        tracing::debug!(
            session_id = %session.id,
            language = %language,
            intent = %intent,
            extracted = ?extracted.present_fields(),
            "Routed turn"
        );

        // Composing
        transitions.advance(DialogueState::Composing);
        let composition = self
            .composer
            .compose(intent, &state, &normalized, session.turn_count(), &newly_set)
            .await;
        state.set_outstanding(composition.asked);

        // Localizing
        transitions.advance(DialogueState::Localizing);
        let response_text = self
            .language
            .localize(&composition.text, language)
            .await
            .map_err(|e| fail(e, TurnFailure::TranslationFailure))?;

        let response_audio = if request.synthesize {
            let audio = self
                .language
                .text_to_speech(&response_text, language)
                .await
                .map_err(|e| fail(e, TurnFailure::SpeechSynthesisFailure))?;
            Some(audio)
        } else {
            None
        };

        Ok((
            Staged {
                raw_input,
                language,
                normalized,
                intent,
                response_english: composition.text,
                verdict: composition.verdict,
                state,
            },
            response_text,
            response_audio,
        ))
    }

    /// Apology in the detected language when possible, otherwise English
    async fn apology(&self, failure: TurnFailure, language: Option<LanguageCode>) -> String {
        let english = apology(failure, self.gate.max_duration_secs());
        let Some(language) = language else {
            return english;
        };

        match self.language.localize(&english, language).await {
            Ok(localized) => localized,
            Err(e) => {
                tracing::debug!(language = %language, error = %e, "Apology left in English");
                english
            }
        }
    }
}

/// Pair an error with its failure kind, using `fallback` for errors without one
fn fail(err: Error, fallback: TurnFailure) -> (TurnFailure, Error) {
    (err.failure_kind().unwrap_or(fallback), err)
}
