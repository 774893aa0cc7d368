//! English response composition
//!
//! Every response is built in English from static tables and the eligibility
//! engine. The LLM, when configured, only elaborates a financial tip; any
//! failure there falls back to the static tip.

use std::sync::Arc;

use loan_assist_config::{catalog, TipCategory};
use loan_assist_core::{
    Decision, EligibilityVerdict, Intent, LanguageModel, LoanType, ProfileField, TurnFailure,
};
use loan_assist_eligibility::EligibilityEngine;

use crate::state::ConversationState;

/// Result of composing one response
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub text: String,
    /// Field this response asks for, if any
    pub asked: Option<ProfileField>,
    pub verdict: Option<EligibilityVerdict>,
}

impl Composition {
    fn text(text: String) -> Self {
        Self {
            text,
            asked: None,
            verdict: None,
        }
    }
}

/// The one question for a profile field
pub fn question_for(field: ProfileField, loan_type: Option<LoanType>) -> String {
    match field {
        ProfileField::Age => "How old are you?".to_string(),
        ProfileField::MonthlyIncome => "What is your monthly income in rupees?".to_string(),
        ProfileField::CreditScore => {
            "What is your credit score? It is a number between 300 and 900.".to_string()
        }
        ProfileField::EmploymentTenure => match loan_type {
            Some(LoanType::Business) => "How many years have you been running your business?".to_string(),
            _ => "How many years have you been in your current job?".to_string(),
        },
        ProfileField::EmploymentType => "Are you salaried or self-employed?".to_string(),
        ProfileField::LoanType => format!(
            "Which loan are you interested in? I can help with {}.",
            loan_type_list()
        ),
    }
}

fn loan_type_list() -> String {
    let names: Vec<&str> = LoanType::all().iter().map(LoanType::display_name).collect();
    match names.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} and {}", rest.join(", "), last),
        Some((last, _)) => last.to_string(),
        None => String::new(),
    }
}

/// Short English apology for a failed turn
pub fn apology(failure: TurnFailure, max_audio_secs: f64) -> String {
    match failure {
        TurnFailure::AudioTooLong => format!(
            "Sorry, your recording is longer than {:.0} seconds. Please record a shorter message.",
            max_audio_secs
        ),
        TurnFailure::EmptyAudio => {
            "Sorry, I could not hear anything in that recording. Please try again.".to_string()
        }
        TurnFailure::EmptyInput => "Please type or say your question.".to_string(),
        TurnFailure::UnsupportedLanguage => {
            "Sorry, I can only help in English and nine Indian languages: Hindi, Tamil, Telugu, \
             Bengali, Kannada, Malayalam, Punjabi, Marathi and Gujarati."
                .to_string()
        }
        TurnFailure::SpeechRecognitionFailure => {
            "Sorry, I could not understand the recording. Please try again or type your message."
                .to_string()
        }
        TurnFailure::TranslationFailure
        | TurnFailure::TransliterationFailure
        | TurnFailure::SpeechSynthesisFailure => {
            "Sorry, something went wrong while processing your message. Please try again."
                .to_string()
        }
    }
}

pub struct ResponseComposer {
    engine: EligibilityEngine,
    llm: Option<Arc<dyn LanguageModel>>,
}

impl ResponseComposer {
    pub fn new(llm: Option<Arc<dyn LanguageModel>>) -> Self {
        Self {
            engine: EligibilityEngine::new(),
            llm,
        }
    }

    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    /// Compose the English response for one routed turn.
    ///
    /// `utterance` is the normalized English input, used to pick a tip
    /// corpus. `turn_index` selects the tip deterministically.
    pub async fn compose(
        &self,
        intent: Intent,
        state: &ConversationState,
        utterance: &str,
        turn_index: usize,
        newly_set: &[ProfileField],
    ) -> Composition {
        let composition = match intent {
            Intent::SlotFilling => self.continue_dialogue(state),
            Intent::EligibilityCheck => self.eligibility(state),
            Intent::ApplicationGuidance => Self::application_guidance(state),
            Intent::FinancialTip => self.financial_tip(utterance, turn_index).await,
        };

        match acknowledgement(newly_set) {
            Some(ack) if intent == Intent::SlotFilling => Composition {
                text: format!("{} {}", ack, composition.text),
                ..composition
            },
            _ => composition,
        }
    }

    /// Ask the next missing field, or give the verdict once nothing is missing
    fn continue_dialogue(&self, state: &ConversationState) -> Composition {
        match state.next_question() {
            Some(field) => Composition {
                text: question_for(field, state.loan_type()),
                asked: Some(field),
                verdict: None,
            },
            None => self.eligibility(state),
        }
    }

    fn eligibility(&self, state: &ConversationState) -> Composition {
        let Some(loan_type) = state.loan_type() else {
            // General fields first; the product comes last
            let field = state.next_question().unwrap_or(ProfileField::LoanType);
            return Composition {
                text: format!(
                    "I can check your eligibility. {}",
                    question_for(field, None)
                ),
                asked: Some(field),
                verdict: None,
            };
        };

        let verdict = self.engine.evaluate(state.profile(), loan_type);
        let (text, asked) = match verdict.decision {
            Decision::InsufficientInformation => {
                let field = verdict.missing_fields.first().copied();
                let mut text = verdict.reasons.join(" ");
                if let Some(field) = field {
                    text.push(' ');
                    text.push_str(&question_for(field, Some(loan_type)));
                }
                (text, field)
            }
            Decision::Eligible => (render_eligible(&verdict), None),
            Decision::NotEligible => (render_not_eligible(&verdict), None),
        };

        tracing::debug!(loan_type = %loan_type, decision = ?verdict.decision, "Composed eligibility response");
        Composition {
            text,
            asked,
            verdict: Some(verdict),
        }
    }

    fn application_guidance(state: &ConversationState) -> Composition {
        let Some(loan_type) = state.loan_type() else {
            return Composition {
                text: format!(
                    "I can walk you through the application. {}",
                    question_for(ProfileField::LoanType, None)
                ),
                asked: Some(ProfileField::LoanType),
                verdict: None,
            };
        };

        let mut lines = vec![format!("How to apply for a {}:", loan_type.display_name())];
        for (index, step) in catalog::application_steps(loan_type).iter().enumerate() {
            lines.push(format!("{}. {}: {}.", index + 1, step.title, step.details.join("; ")));
        }
        Composition::text(lines.join("\n"))
    }

    async fn financial_tip(&self, utterance: &str, turn_index: usize) -> Composition {
        let category = TipCategory::for_context(utterance);
        let tip = category.pick(turn_index);
        let heading = category.heading();

        let Some(llm) = &self.llm else {
            return Composition::text(format!("{}: {}", heading, tip));
        };

        let prompt = format!(
            "Explain this {} for a borrower in India in two or three sentences: \"{}\"",
            heading.to_lowercase(),
            tip
        );
        match llm.complete(&prompt).await {
            Ok(elaboration) => {
                tracing::debug!(model = %llm.model_name(), "Tip elaborated by LLM");
                Composition::text(format!("{}: {}\n\n{}", heading, tip, elaboration))
            }
            Err(e) => {
                tracing::warn!(error = %e, "LLM unavailable, using static tip");
                Composition::text(format!("{}: {}", heading, tip))
            }
        }
    }
}

fn acknowledgement(newly_set: &[ProfileField]) -> Option<String> {
    let labels: Vec<&str> = newly_set.iter().map(ProfileField::label).collect();
    match labels.as_slice() {
        [] => None,
        [one] => Some(format!("Thanks, I have noted your {}.", one)),
        [rest @ .., last] => Some(format!(
            "Thanks, I have noted your {} and {}.",
            rest.join(", "),
            last
        )),
    }
}

fn render_eligible(verdict: &EligibilityVerdict) -> String {
    let product = catalog::product(verdict.loan_type);
    let mut lines = vec![format!(
        "Good news! You appear to be eligible for a {}.",
        verdict.loan_type.display_name()
    )];
    lines.extend(verdict.reasons.iter().map(|r| format!("- {}", r)));
    lines.push(format!(
        "Interest rates typically range from {}.",
        product.interest_rate_range
    ));
    let documents: Vec<&str> = product.documents_required.iter().take(3).copied().collect();
    if !documents.is_empty() {
        lines.push(format!("Keep these documents ready: {}.", documents.join("; ")));
    }
    lines.push("Ask me how to apply when you are ready.".to_string());
    lines.join("\n")
}

fn render_not_eligible(verdict: &EligibilityVerdict) -> String {
    let mut lines = vec![format!(
        "Based on what you have shared, you may not be eligible for a {} yet.",
        verdict.loan_type.display_name()
    )];
    lines.extend(verdict.reasons.iter().map(|r| format!("- {}", r)));
    if !verdict.suggestions.is_empty() {
        lines.push("To improve your chances:".to_string());
        lines.extend(verdict.suggestions.iter().map(|s| format!("- {}", s)));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use loan_assist_core::{EmploymentType, Error, FinancialProfile};

    struct FailingLlm;

    #[async_trait]
    impl LanguageModel for FailingLlm {
        async fn complete(&self, _prompt: &str) -> loan_assist_core::Result<String> {
            Err(Error::LlmUnavailable("connection refused".to_string()))
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    struct EchoLlm;

    #[async_trait]
    impl LanguageModel for EchoLlm {
        async fn complete(&self, _prompt: &str) -> loan_assist_core::Result<String> {
            Ok("Late payments stay on your report for years.".to_string())
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    fn state(profile: FinancialProfile) -> ConversationState {
        let mut state = ConversationState::new();
        state.update(&profile);
        state
    }

    fn complete_home() -> FinancialProfile {
        FinancialProfile {
            age: Some(32),
            monthly_income: Some(45_000),
            credit_score: Some(750),
            employment_tenure_years: Some(5.0),
            employment_type: Some(EmploymentType::Salaried),
            loan_type: Some(LoanType::Home),
        }
    }

    #[tokio::test]
    async fn test_slot_filling_asks_one_question() {
        let composer = ResponseComposer::new(None);
        let state = state(FinancialProfile {
            age: Some(32),
            ..Default::default()
        });
        let out = composer
            .compose(Intent::SlotFilling, &state, "i am 32", 0, &[ProfileField::Age])
            .await;
        assert_eq!(out.asked, Some(ProfileField::MonthlyIncome));
        assert!(out.text.starts_with("Thanks, I have noted your age."));
        assert!(out.text.contains("monthly income"));
        assert_eq!(out.text.matches('?').count(), 1);
    }

    #[tokio::test]
    async fn test_eligible_verdict_rendering() {
        let composer = ResponseComposer::new(None);
        let out = composer
            .compose(Intent::EligibilityCheck, &state(complete_home()), "am i eligible", 0, &[])
            .await;
        let verdict = out.verdict.unwrap();
        assert!(verdict.is_eligible());
        assert!(out.text.starts_with("Good news!"));
        assert!(out.text.contains("Interest rates"));
        assert_eq!(out.asked, None);
    }

    #[tokio::test]
    async fn test_not_eligible_lists_suggestions() {
        let composer = ResponseComposer::new(None);
        let mut profile = complete_home();
        profile.monthly_income = Some(18_000);
        let out = composer
            .compose(Intent::EligibilityCheck, &state(profile), "am i eligible", 0, &[])
            .await;
        assert!(out.text.contains("To improve your chances:"));
        assert!(out.text.contains("co-applicant"));
    }

    #[tokio::test]
    async fn test_eligibility_without_loan_type_asks_general_fields_first() {
        let composer = ResponseComposer::new(None);
        let out = composer
            .compose(Intent::EligibilityCheck, &ConversationState::new(), "am i eligible", 0, &[])
            .await;
        assert_eq!(out.asked, Some(ProfileField::Age));
        assert!(out.verdict.is_none());
    }

    #[tokio::test]
    async fn test_insufficient_information_asks_next_required() {
        let composer = ResponseComposer::new(None);
        let out = composer
            .compose(
                Intent::EligibilityCheck,
                &state(FinancialProfile {
                    age: Some(30),
                    loan_type: Some(LoanType::Car),
                    ..Default::default()
                }),
                "am i eligible for a car loan",
                0,
                &[],
            )
            .await;
        assert_eq!(out.asked, Some(ProfileField::MonthlyIncome));
        assert_eq!(
            out.verdict.unwrap().decision,
            Decision::InsufficientInformation
        );
    }

    #[tokio::test]
    async fn test_application_guidance() {
        let composer = ResponseComposer::new(None);
        let out = composer
            .compose(Intent::ApplicationGuidance, &state(complete_home()), "how do i apply", 0, &[])
            .await;
        assert!(out.text.contains("1. Check Your Eligibility"));
        assert!(out.text.contains("6. Approval & Disbursement"));

        let out = composer
            .compose(Intent::ApplicationGuidance, &ConversationState::new(), "how do i apply", 0, &[])
            .await;
        assert_eq!(out.asked, Some(ProfileField::LoanType));
        assert!(out.text.contains("Microfinance"));
    }

    #[tokio::test]
    async fn test_tip_falls_back_when_llm_fails() {
        let composer = ResponseComposer::new(Some(Arc::new(FailingLlm)));
        let out = composer
            .compose(Intent::FinancialTip, &ConversationState::new(), "improve my credit score", 1, &[])
            .await;
        assert_eq!(
            out.text,
            "Credit score tip: Keep your credit card utilization below 30% of your limit."
        );
    }

    #[tokio::test]
    async fn test_tip_elaborated_by_llm() {
        let composer = ResponseComposer::new(Some(Arc::new(EchoLlm)));
        let out = composer
            .compose(Intent::FinancialTip, &ConversationState::new(), "budget advice", 0, &[])
            .await;
        assert!(out.text.starts_with("Saving tip: "));
        assert!(out.text.ends_with("Late payments stay on your report for years."));
    }

    #[test]
    fn test_apology_mentions_limit() {
        assert!(apology(TurnFailure::AudioTooLong, 30.0).contains("30 seconds"));
    }
}
