//! End-to-end dialogue tests against the scripted language authority

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use loan_assist_agent::{
    apology, DialogueOrchestrator, LoanAssistant, ResponseComposer, TurnOutcome, TurnRequest,
};
use loan_assist_config::TipCategory;
use loan_assist_core::{
    Decision, DialogueState, EmploymentType, Error, Intent, LanguageCode, LanguageModel, LoanType,
    Modality, ProfileField, RawInput, Result, TurnFailure,
};
use loan_assist_persistence::JsonSessionStore;
use loan_assist_pipeline::{AudioGate, LanguageOperation, LanguageService, ScriptedAuthority};

const KANNADA_UTTERANCE: &str = "ನನಗೆ 32 ವರ್ಷ ವಯಸ್ಸು, ತಿಂಗಳಿಗೆ 45,000 ರೂಪಾಯಿ ಸಂಬಳ ಇದೆ, ಮತ್ತು 750 ಕ್ರೆಡಿಟ್ ಸ್ಕೋರ್ ಇದೆ.. \
    ನಾನು ಗೃಹ ಸಾಲದ ಅರ್ಹತೆ ಹೊಂದಿದ್ದೇನೆಯೇ? ನಾನು ಕಳೆದ ಐದು ವರ್ಷಗಳಿಂದ ವೇತನಭೋಗಿ ಉದ್ಯೋಗಿಯಾಗಿದ್ದೇನೆ.";

const KANNADA_ENGLISH: &str = "I am 32 years old, I have a salary of 45,000 rupees per month, \
    and I have a credit score of 750.. Am I eligible for a home loan? \
    I have been a salaried employee for the last five years.";

const HINDI_UTTERANCE: &str = "मुझे लोन चाहिए";

struct FailingLlm;

#[async_trait]
impl LanguageModel for FailingLlm {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(Error::LlmUnavailable("connection refused".to_string()))
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

struct Harness {
    authority: Arc<ScriptedAuthority>,
    assistant: LoanAssistant,
}

fn harness_with(llm: Option<Arc<dyn LanguageModel>>, timeout: Duration) -> Harness {
    let authority = Arc::new(ScriptedAuthority::new());
    let language = LanguageService::new(authority.clone(), timeout);
    let orchestrator =
        DialogueOrchestrator::new(language, AudioGate::default(), ResponseComposer::new(llm));
    Harness {
        authority,
        assistant: LoanAssistant::new(orchestrator),
    }
}

fn harness() -> Harness {
    harness_with(None, Duration::from_secs(2))
}

const DELIVERED_PATH: [DialogueState; 6] = [
    DialogueState::AwaitingInput,
    DialogueState::Normalizing,
    DialogueState::Routing,
    DialogueState::Composing,
    DialogueState::Localizing,
    DialogueState::Delivered,
];

fn failure_of(outcome: &TurnOutcome) -> TurnFailure {
    match &outcome.result {
        Err(failed) => failed.failure,
        Ok(delivered) => panic!("expected a failed turn, got {:?}", delivered.response_english),
    }
}

#[tokio::test]
async fn test_kannada_home_loan_scenario() {
    let h = harness();
    h.authority.script_translation(
        KANNADA_UTTERANCE,
        LanguageCode::Kannada,
        LanguageCode::English,
        KANNADA_ENGLISH,
    );

    let request =
        TurnRequest::text(KANNADA_UTTERANCE).with_display_language(LanguageCode::Tamil);
    let outcome = h.assistant.submit_turn("kn", request).await.unwrap();
    assert_eq!(outcome.states, DELIVERED_PATH.to_vec());

    let delivered = outcome.result.unwrap();
    assert_eq!(delivered.detected_language, LanguageCode::Kannada);
    assert_eq!(delivered.intent, Intent::EligibilityCheck);
    let verdict = delivered.verdict.expect("verdict");
    assert_eq!(verdict.loan_type, LoanType::Home);
    assert_eq!(verdict.decision, Decision::Eligible);
    assert!(delivered.response_english.starts_with("Good news!"));

    // Kannada script, not the Tamil display language
    assert!(delivered
        .response_text
        .chars()
        .any(|c| LanguageCode::Kannada.script().contains_char(c)));
    assert!(!delivered
        .response_text
        .chars()
        .any(|c| LanguageCode::Tamil.script().contains_char(c)));
    let service = h.assistant.orchestrator().language_service();
    assert_eq!(
        service.detect(&delivered.response_text).await.unwrap(),
        LanguageCode::Kannada
    );

    let session = h.assistant.get_session("kn").await.unwrap();
    let profile = session.state.profile();
    assert_eq!(profile.age, Some(32));
    assert_eq!(profile.monthly_income, Some(45_000));
    assert_eq!(profile.credit_score, Some(750));
    assert_eq!(profile.employment_tenure_years, Some(5.0));
    assert_eq!(profile.employment_type, Some(EmploymentType::Salaried));
    assert_eq!(profile.loan_type, Some(LoanType::Home));
    assert_eq!(session.detected_language, Some(LanguageCode::Kannada));
    assert_eq!(session.display_language, Some(LanguageCode::Tamil));
    assert_eq!(session.turns[0].normalized_text, KANNADA_ENGLISH);
}

#[tokio::test]
async fn test_age_alone_asks_for_monthly_income() {
    let h = harness();
    let outcome = h
        .assistant
        .submit_turn("s", TurnRequest::text("I am 32"))
        .await
        .unwrap();

    let delivered = outcome.result.unwrap();
    assert_eq!(delivered.intent, Intent::SlotFilling);
    assert_eq!(
        delivered.response_english,
        "Thanks, I have noted your age. What is your monthly income in rupees?"
    );
    // English in, English out
    assert_eq!(delivered.response_text, delivered.response_english);

    let session = h.assistant.get_session("s").await.unwrap();
    assert_eq!(session.state.outstanding(), Some(ProfileField::MonthlyIncome));
    assert_eq!(session.turns[0].modality, Modality::Text);
}

#[tokio::test]
async fn test_repeated_answer_sets_field_once() {
    let h = harness();
    h.assistant
        .submit_turn("s", TurnRequest::text("I am 32"))
        .await
        .unwrap();
    let first = h.assistant.get_session("s").await.unwrap();

    let outcome = h
        .assistant
        .submit_turn("s", TurnRequest::text("I am 32"))
        .await
        .unwrap();
    let delivered = outcome.result.unwrap();
    assert!(!delivered.response_english.starts_with("Thanks"));

    let second = h.assistant.get_session("s").await.unwrap();
    assert_eq!(second.state, first.state);
    assert_eq!(second.turn_count(), 2);
}

#[tokio::test]
async fn test_missing_fields_never_grow() {
    let h = harness();
    let turns = [
        "I am 32",
        "45000",
        "hello",
        "my credit score is 750",
        "What documents do I need?",
        "I want a home loan",
        "I am 40 years old",
        "I have been salaried for 6 years",
    ];

    let mut previous = ProfileField::ORDER.len();
    for text in turns {
        let outcome = h
            .assistant
            .submit_turn("s", TurnRequest::text(text))
            .await
            .unwrap();
        let missing = outcome.result.unwrap().missing_fields.len();
        assert!(missing <= previous, "{text:?} grew missing fields");
        previous = missing;
    }
    assert_eq!(previous, 0);

    let session = h.assistant.get_session("s").await.unwrap();
    // The first age answer stands
    assert_eq!(session.state.profile().age, Some(32));
    assert_eq!(session.state.profile().monthly_income, Some(45_000));
}

#[tokio::test]
async fn test_failed_turn_leaves_state_unchanged() {
    let h = harness();
    h.assistant
        .submit_turn("s", TurnRequest::text("I am 32"))
        .await
        .unwrap();
    let before = h.assistant.get_session("s").await.unwrap();

    h.authority.fail(LanguageOperation::Translate);
    let outcome = h
        .assistant
        .submit_turn("s", TurnRequest::text(HINDI_UTTERANCE))
        .await
        .unwrap();

    assert_eq!(failure_of(&outcome), TurnFailure::TranslationFailure);
    assert_eq!(
        outcome.final_state(),
        DialogueState::Failed(TurnFailure::TranslationFailure)
    );
    let failed = outcome.result.unwrap_err();
    assert_eq!(failed.detected_language, Some(LanguageCode::Hindi));
    // The apology cannot be translated either
    assert_eq!(failed.apology, apology(TurnFailure::TranslationFailure, 30.0));

    let after = h.assistant.get_session("s").await.unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_translation_timeout_is_translation_failure() {
    let h = harness_with(None, Duration::from_millis(50));
    h.authority
        .delay(LanguageOperation::Translate, Duration::from_millis(300));

    let outcome = h
        .assistant
        .submit_turn("s", TurnRequest::text(HINDI_UTTERANCE))
        .await
        .unwrap();

    let failed = outcome.result.unwrap_err();
    assert_eq!(failed.failure, TurnFailure::TranslationFailure);
    assert!(failed.error.contains("timed out"));
    assert_eq!(h.assistant.get_session("s").await.unwrap().turn_count(), 0);
}

#[tokio::test]
async fn test_localized_apology_when_language_known() {
    let h = harness();
    h.authority.fail(LanguageOperation::TextToSpeech);

    let outcome = h
        .assistant
        .submit_turn("s", TurnRequest::text(HINDI_UTTERANCE).with_speech())
        .await
        .unwrap();

    let failed = outcome.result.unwrap_err();
    assert_eq!(failed.failure, TurnFailure::SpeechSynthesisFailure);
    assert!(failed
        .apology
        .chars()
        .any(|c| LanguageCode::Hindi.script().contains_char(c)));
}

#[tokio::test]
async fn test_unsupported_language_apologizes_in_english() {
    let h = harness();
    h.authority.script_detection("Bonjour, je voudrais un prêt", "fr-FR");

    let outcome = h
        .assistant
        .submit_turn("s", TurnRequest::text("Bonjour, je voudrais un prêt"))
        .await
        .unwrap();

    let failed = outcome.result.unwrap_err();
    assert_eq!(failed.failure, TurnFailure::UnsupportedLanguage);
    assert_eq!(failed.detected_language, None);
    assert_eq!(failed.apology, apology(TurnFailure::UnsupportedLanguage, 30.0));
}

#[tokio::test]
async fn test_empty_text_is_rejected() {
    let h = harness();
    let outcome = h
        .assistant
        .submit_turn("s", TurnRequest::text("   "))
        .await
        .unwrap();
    assert_eq!(failure_of(&outcome), TurnFailure::EmptyInput);
}

#[tokio::test]
async fn test_llm_failure_falls_back_to_static_tip() {
    let h = harness_with(Some(Arc::new(FailingLlm)), Duration::from_secs(2));
    let text = "How can I improve my credit score?";

    let outcome = h
        .assistant
        .submit_turn("s", TurnRequest::text(text))
        .await
        .unwrap();

    let delivered = outcome.result.unwrap();
    assert_eq!(delivered.intent, Intent::FinancialTip);
    let category = TipCategory::for_context(text);
    assert_eq!(
        delivered.response_english,
        format!("{}: {}", category.heading(), category.pick(0))
    );
}

#[tokio::test]
async fn test_audio_gate_boundary() {
    let h = harness();
    let recording = vec![1u8; 64];

    h.authority.script_transcript("I am 32 years old", Some("en-IN"));
    let outcome = h
        .assistant
        .submit_turn("s", TurnRequest::voice(recording.clone(), Some(30.0)))
        .await
        .unwrap();
    assert!(outcome.is_delivered());

    let session = h.assistant.get_session("s").await.unwrap();
    assert_eq!(session.turns[0].modality, Modality::Voice);
    assert_eq!(
        session.turns[0].raw_input,
        RawInput::Audio {
            bytes: 64,
            duration_secs: 30.0
        }
    );

    let outcome = h
        .assistant
        .submit_turn("s", TurnRequest::voice(recording, Some(30.01)))
        .await
        .unwrap();
    assert_eq!(failure_of(&outcome), TurnFailure::AudioTooLong);
    assert!(outcome.result.unwrap_err().apology.contains("30 seconds"));

    let outcome = h
        .assistant
        .submit_turn("s", TurnRequest::voice(Vec::new(), Some(5.0)))
        .await
        .unwrap();
    assert_eq!(failure_of(&outcome), TurnFailure::EmptyAudio);

    let outcome = h
        .assistant
        .submit_turn("s", TurnRequest::voice(vec![1u8; 64], Some(0.0)))
        .await
        .unwrap();
    assert_eq!(failure_of(&outcome), TurnFailure::EmptyAudio);

    assert_eq!(h.assistant.get_session("s").await.unwrap().turn_count(), 1);
}

#[tokio::test]
async fn test_voice_turn_with_speech_response() {
    let h = harness();
    h.authority.script_transcript(HINDI_UTTERANCE, Some("hi-IN"));

    let outcome = h
        .assistant
        .submit_turn("s", TurnRequest::voice(vec![1u8; 32], Some(3.0)).with_speech())
        .await
        .unwrap();

    let delivered = outcome.result.unwrap();
    assert_eq!(delivered.detected_language, LanguageCode::Hindi);
    let audio = delivered.response_audio.expect("audio");
    assert_eq!(&audio[..4], b"RIFF");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_turns_on_one_session_are_serialized() {
    let h = harness();
    h.authority
        .delay(LanguageOperation::Detect, Duration::from_millis(10));
    let log = h.authority.call_log();
    let assistant = Arc::new(h.assistant);

    let mut handles = Vec::new();
    for _ in 0..6 {
        let assistant = Arc::clone(&assistant);
        handles.push(tokio::spawn(async move {
            assistant
                .submit_turn("shared", TurnRequest::text(HINDI_UTTERANCE))
                .await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().unwrap().is_delivered());
    }

    let session = assistant.get_session("shared").await.unwrap();
    assert_eq!(session.turn_count(), 6);

    // Each turn's calls run back to back
    let calls = log.lock().clone();
    assert_eq!(calls.len(), 6 * 4);
    for turn in calls.chunks(4) {
        assert_eq!(
            turn,
            [
                LanguageOperation::Detect,
                LanguageOperation::Translate,
                LanguageOperation::Translate,
                LanguageOperation::Transliterate,
            ]
        );
    }
}

#[tokio::test]
async fn test_sessions_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions.json");

    let h = harness();
    let assistant = h
        .assistant
        .with_store(Arc::new(JsonSessionStore::open(&path)))
        .await;
    assistant
        .submit_turn("s", TurnRequest::text("I am 32"))
        .await
        .unwrap();

    let restarted = harness()
        .assistant
        .with_store(Arc::new(JsonSessionStore::open(&path)))
        .await;
    let session = restarted.get_session("s").await.unwrap();
    assert_eq!(session.turn_count(), 1);
    assert_eq!(session.state.profile().age, Some(32));
    assert_eq!(session.state.outstanding(), Some(ProfileField::MonthlyIncome));
}

#[tokio::test]
async fn test_tenure_answer_keeps_requested_loan_type() {
    let h = harness();
    h.assistant
        .submit_turn(
            "s",
            TurnRequest::text(
                "Am I eligible for a home loan? I am 32 years old, \
                 my salary is 45000 rupees per month, my credit score is 750",
            ),
        )
        .await
        .unwrap();
    let session = h.assistant.get_session("s").await.unwrap();
    assert_eq!(session.state.outstanding(), Some(ProfileField::EmploymentTenure));

    // "company" is a business loan term, but the user asked about a home loan
    let outcome = h
        .assistant
        .submit_turn("s", TurnRequest::text("I have been working at my company for 5 years"))
        .await
        .unwrap();
    let delivered = outcome.result.unwrap();
    let verdict = delivered.verdict.expect("verdict");
    assert_eq!(verdict.loan_type, LoanType::Home);
    assert_eq!(verdict.decision, Decision::Eligible);

    let session = h.assistant.get_session("s").await.unwrap();
    assert_eq!(session.state.loan_type(), Some(LoanType::Home));
    assert_eq!(session.state.profile().employment_tenure_years, Some(5.0));
}

#[tokio::test]
async fn test_income_answer_keeps_requested_loan_type() {
    let h = harness();
    h.assistant
        .submit_turn("s", TurnRequest::text("I want a car loan. I am 30 years old"))
        .await
        .unwrap();

    h.assistant
        .submit_turn("s", TurnRequest::text("My take home salary is 40000 rupees"))
        .await
        .unwrap();

    let session = h.assistant.get_session("s").await.unwrap();
    assert_eq!(session.state.loan_type(), Some(LoanType::Car));
    assert_eq!(session.state.profile().monthly_income, Some(40_000));
    assert_eq!(session.state.outstanding(), Some(ProfileField::CreditScore));
}

#[tokio::test]
async fn test_named_product_switches_loan_type() {
    let h = harness();
    h.assistant
        .submit_turn("s", TurnRequest::text("I want a car loan"))
        .await
        .unwrap();
    h.assistant
        .submit_turn("s", TurnRequest::text("Actually I want a home loan"))
        .await
        .unwrap();

    let session = h.assistant.get_session("s").await.unwrap();
    assert_eq!(session.state.loan_type(), Some(LoanType::Home));
}

#[tokio::test]
async fn test_business_answers_employment_question() {
    let h = harness();
    let outcome = h
        .assistant
        .submit_turn(
            "s",
            TurnRequest::text(
                "I am 35 years old, my income is 60000 rupees per month, \
                 my credit score is 720, I have 4 years of experience",
            ),
        )
        .await
        .unwrap();
    assert_eq!(outcome.result.unwrap().intent, Intent::SlotFilling);
    let session = h.assistant.get_session("s").await.unwrap();
    assert_eq!(session.state.outstanding(), Some(ProfileField::EmploymentType));

    let outcome = h
        .assistant
        .submit_turn("s", TurnRequest::text("business"))
        .await
        .unwrap();
    let delivered = outcome.result.unwrap();
    assert!(delivered.response_english.contains("employment type"));

    let session = h.assistant.get_session("s").await.unwrap();
    let profile = session.state.profile();
    assert_eq!(profile.employment_type, Some(EmploymentType::SelfEmployed));
    assert_eq!(profile.loan_type, None);
    assert_eq!(session.state.outstanding(), Some(ProfileField::LoanType));
}

#[tokio::test]
async fn test_stated_credit_score_continues_slot_filling() {
    let h = harness();
    let outcome = h
        .assistant
        .submit_turn("s", TurnRequest::text("I am 32 and my credit score is 750"))
        .await
        .unwrap();

    let delivered = outcome.result.unwrap();
    assert_eq!(delivered.intent, Intent::SlotFilling);
    assert!(delivered.response_english.contains("monthly income"));

    let session = h.assistant.get_session("s").await.unwrap();
    assert_eq!(session.state.profile().age, Some(32));
    assert_eq!(session.state.profile().credit_score, Some(750));
    assert_eq!(session.state.outstanding(), Some(ProfileField::MonthlyIncome));
}

#[tokio::test]
async fn test_session_ended_mid_turn_stays_deleted() {
    let h = harness();
    h.authority
        .delay(LanguageOperation::Detect, Duration::from_millis(200));
    let store = Arc::new(JsonSessionStore::in_memory());
    let assistant = Arc::new(h.assistant.with_store(store.clone()).await);

    let turn = {
        let assistant = Arc::clone(&assistant);
        tokio::spawn(async move {
            assistant
                .submit_turn("s", TurnRequest::text("I am 32"))
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(assistant.end_session("s").await);

    assert!(turn.await.unwrap().unwrap().is_delivered());
    assert!(store.get("s").await.is_none());
    assert_eq!(assistant.session_count(), 0);
}
