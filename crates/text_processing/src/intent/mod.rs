//! Intent routing and loan type matching
//!
//! Classifies normalized English text into exactly one [`Intent`] using
//! keyword sets only. Precedence is eligibility, then application, then
//! tips. A bare slot answer wins over keywords when the previous response
//! asked for a field, and text with no keyword continues slot filling.
//!
//! # Example
//!
//! ```ignore
//! use loan_assist_core::{Intent, ProfileField};
//! use loan_assist_text_processing::IntentRouter;
//!
//! let router = IntentRouter::new();
//! assert_eq!(router.route("How do I apply for a car loan?", None), Intent::ApplicationGuidance);
//! assert_eq!(router.route("750", Some(ProfileField::CreditScore)), Intent::SlotFilling);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use loan_assist_config::catalog;
use loan_assist_core::{Intent, LoanType, ProfileField};

// Keyword sets, matched on word boundaries
static ELIGIBILITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:eligible|eligibility|qualify|qualifies|qualification|can i get|am i eligible)\b")
        .unwrap()
});
static APPLICATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:apply|applying|application|process|procedure|how to get|documents?|steps)\b")
        .unwrap()
});
static TIP_REQUEST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:advice|advise|tips?|suggestions?|recommend\w*|improve|saving|savings|save|budget\w*)\b")
        .unwrap()
});
// Also a profile field, so only a tip when nothing else was said
static CREDIT_SCORE_TOPIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bcredit score\b").unwrap());

// Bare answers: numbers, yes/no, employment words, short loan phrases
static BARE_ANSWER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\d|yes\b|no\b|yeah\b|nope\b|salaried\b|self[\s-]?employed\b|business\b|own\b|job\b|it'?s\b|it is\b|my \w+(?: \w+)? is\b|about\b|around\b|[a-z]+ loan$)")
        .unwrap()
});
static NUMBER_WORD_ANSWER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:zero|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|thirteen|fourteen|fifteen|sixteen|seventeen|eighteen|nineteen|twenty|thirty|forty|fifty|sixty|seventy|eighty|ninety)\b")
        .unwrap()
});

/// Most words a bare slot answer may contain
const BARE_ANSWER_MAX_WORDS: usize = 6;

/// Keyword-based intent router
#[derive(Debug, Clone, Default)]
pub struct IntentRouter {
    loan_types: LoanTypeMatcher,
}

impl IntentRouter {
    pub fn new() -> Self {
        Self {
            loan_types: LoanTypeMatcher::new(),
        }
    }

    /// Route one utterance.
    ///
    /// `outstanding` is the field the previous response asked for.
    pub fn route(&self, text: &str, outstanding: Option<ProfileField>) -> Intent {
        self.route_with_profile(text, outstanding, &[])
    }

    /// Route one utterance that set `newly_set` profile fields.
    ///
    /// Stating a credit score ("my credit score is 750") is slot filling, not
    /// a request for credit score tips.
    pub fn route_with_profile(
        &self,
        text: &str,
        outstanding: Option<ProfileField>,
        newly_set: &[ProfileField],
    ) -> Intent {
        let lower = text.trim().to_lowercase();

        if outstanding.is_some() && self.is_bare_answer(&lower) {
            tracing::debug!(outstanding = ?outstanding, "Bare answer to outstanding question");
            return Intent::SlotFilling;
        }

        let intent = match Self::keyword_intent(&lower) {
            Some(Intent::FinancialTip) if !newly_set.is_empty() && !TIP_REQUEST.is_match(&lower) => {
                Intent::SlotFilling
            }
            Some(intent) => intent,
            None => Intent::SlotFilling,
        };
        tracing::debug!(intent = %intent, "Routed utterance");
        intent
    }

    /// Keyword classification alone, in precedence order
    pub fn keyword_intent(lower: &str) -> Option<Intent> {
        if ELIGIBILITY.is_match(lower) {
            Some(Intent::EligibilityCheck)
        } else if APPLICATION.is_match(lower) {
            Some(Intent::ApplicationGuidance)
        } else if TIP_REQUEST.is_match(lower) || CREDIT_SCORE_TOPIC.is_match(lower) {
            Some(Intent::FinancialTip)
        } else {
            None
        }
    }

    /// Whether the text looks like a short answer to a slot question
    pub fn is_bare_answer(&self, lower: &str) -> bool {
        let lower = lower.trim().trim_end_matches(['.', '!', '?']);
        if lower.is_empty() || lower.split_whitespace().count() > BARE_ANSWER_MAX_WORDS {
            return false;
        }
        // Questions are never bare answers
        if ELIGIBILITY.is_match(lower) || APPLICATION.is_match(lower) {
            return false;
        }
        BARE_ANSWER.is_match(lower)
            || NUMBER_WORD_ANSWER.is_match(lower)
            || self.loan_types.detect(lower).is_some()
    }
}

/// Recognizes a loan product named in free text.
///
/// Product names and ids are tried first; failing that, the longest matching
/// related term wins ("small business" beats "business").
#[derive(Debug, Clone)]
pub struct LoanTypeMatcher {
    names: Vec<(Regex, LoanType)>,
    terms: Vec<(Regex, usize, LoanType)>,
}

impl LoanTypeMatcher {
    pub fn new() -> Self {
        let mut names = Vec::new();
        let mut terms = Vec::new();

        for product in catalog::products() {
            let loan_type = product.loan_type;
            let id = loan_type.id().replace('_', " ");
            let name = product.name().to_lowercase();
            let pattern = format!(
                r"\b(?:{}|{} loan)\b",
                regex::escape(&name),
                regex::escape(&id)
            );
            if let Ok(re) = Regex::new(&pattern) {
                names.push((re, loan_type));
            }

            for term in product.related_terms {
                if let Ok(re) = Regex::new(&format!(r"\b{}s?\b", regex::escape(term))) {
                    terms.push((re, term.len(), loan_type));
                }
            }
        }

        Self { names, terms }
    }

    /// Loan type named in `text`, if any
    pub fn detect(&self, text: &str) -> Option<LoanType> {
        let lower = text.to_lowercase();

        if let Some(loan_type) = self.detect_named(&lower) {
            return Some(loan_type);
        }

        self.terms
            .iter()
            .filter(|(re, _, _)| re.is_match(&lower))
            .max_by_key(|(_, len, _)| *len)
            .map(|(_, _, loan_type)| *loan_type)
    }
}

impl LoanTypeMatcher {
    /// Loan type named by product name or id only ("home loan", "credit card")
    pub fn detect_named(&self, text: &str) -> Option<LoanType> {
        let lower = text.to_lowercase();
        self.names
            .iter()
            .find(|(re, _)| re.is_match(&lower))
            .map(|(_, loan_type)| *loan_type)
    }
}

impl Default for LoanTypeMatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_precedence() {
        let router = IntentRouter::new();
        assert_eq!(
            router.route("Am I eligible for a home loan? How do I apply?", None),
            Intent::EligibilityCheck
        );
        assert_eq!(
            router.route("What documents do I need? Any tips?", None),
            Intent::ApplicationGuidance
        );
        assert_eq!(
            router.route("How can I improve my credit score?", None),
            Intent::FinancialTip
        );
    }

    #[test]
    fn test_no_keyword_continues_dialogue() {
        let router = IntentRouter::new();
        assert_eq!(router.route("I am 32", None), Intent::SlotFilling);
        assert_eq!(router.route("hello", None), Intent::SlotFilling);
    }

    #[test]
    fn test_word_boundaries() {
        let router = IntentRouter::new();
        // "multiple" contains "tip", "processing" contains "process"
        assert_eq!(router.route("multiple processing", None), Intent::SlotFilling);
    }

    #[test]
    fn test_bare_answer_wins_with_outstanding_field() {
        let router = IntentRouter::new();
        assert_eq!(
            router.route("credit score 750", None),
            Intent::FinancialTip
        );
        assert_eq!(
            router.route("my credit score is 750", Some(ProfileField::CreditScore)),
            Intent::SlotFilling
        );
        assert_eq!(
            router.route("five years", Some(ProfileField::EmploymentTenure)),
            Intent::SlotFilling
        );
        assert_eq!(
            router.route("home loan", Some(ProfileField::LoanType)),
            Intent::SlotFilling
        );
    }

    #[test]
    fn test_questions_are_not_bare_answers() {
        let router = IntentRouter::new();
        assert_eq!(
            router.route("am I eligible?", Some(ProfileField::Age)),
            Intent::EligibilityCheck
        );
    }

    #[test]
    fn test_loan_type_names() {
        let matcher = LoanTypeMatcher::new();
        assert_eq!(matcher.detect("Am I eligible for a Home Loan?"), Some(LoanType::Home));
        assert_eq!(matcher.detect("I want a credit card"), Some(LoanType::CreditCard));
        assert_eq!(matcher.detect("gold loan please"), Some(LoanType::Gold));
    }

    #[test]
    fn test_loan_type_related_terms() {
        let matcher = LoanTypeMatcher::new();
        assert_eq!(matcher.detect("I want to buy a flat"), Some(LoanType::Home));
        assert_eq!(matcher.detect("money for my vehicle"), Some(LoanType::Car));
        assert_eq!(matcher.detect("I pledge my jewellery"), Some(LoanType::Gold));
        assert_eq!(matcher.detect("for my crops"), Some(LoanType::Agriculture));
        assert_eq!(
            matcher.detect("loan for my small business"),
            Some(LoanType::Microfinance)
        );
        assert_eq!(matcher.detect("I am 32"), None);
    }

    #[test]
    fn test_stated_credit_score_is_slot_filling() {
        let router = IntentRouter::new();
        let newly_set = [ProfileField::Age, ProfileField::CreditScore];
        assert_eq!(
            router.route_with_profile("I am 32 and my credit score is 750", None, &newly_set),
            Intent::SlotFilling
        );
        // Asking for advice still gets a tip
        assert_eq!(
            router.route_with_profile(
                "my credit score is 600, how can I improve it",
                None,
                &[ProfileField::CreditScore]
            ),
            Intent::FinancialTip
        );
        assert_eq!(
            router.route_with_profile("tell me about credit score", None, &[]),
            Intent::FinancialTip
        );
    }

    #[test]
    fn test_named_loan_type_ignores_related_terms() {
        let matcher = LoanTypeMatcher::new();
        let tenure_answer = "I have been working at my company for 5 years";
        assert_eq!(matcher.detect(tenure_answer), Some(LoanType::Business));
        assert_eq!(matcher.detect_named(tenure_answer), None);
        assert_eq!(matcher.detect_named("my take home salary is 40000 rupees"), None);
        assert_eq!(matcher.detect_named("actually I want a car loan"), Some(LoanType::Car));
    }

    #[test]
    fn test_credit_score_is_not_credit_card() {
        let matcher = LoanTypeMatcher::new();
        assert_eq!(matcher.detect("my credit score is 750"), None);
    }
}
