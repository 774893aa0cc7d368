//! Conversation state
//!
//! The financial profile gathered so far plus the field the last response
//! asked for. Only the dialogue orchestrator mutates it, and only by
//! committing a staged copy once a turn is delivered.

use serde::{Deserialize, Serialize};

use loan_assist_config::catalog;
use loan_assist_core::{FinancialProfile, LoanType, ProfileField};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    profile: FinancialProfile,
    /// Field most recently asked for
    #[serde(default)]
    outstanding: Option<ProfileField>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile(&self) -> &FinancialProfile {
        &self.profile
    }

    pub fn outstanding(&self) -> Option<ProfileField> {
        self.outstanding
    }

    pub fn set_outstanding(&mut self, field: Option<ProfileField>) {
        self.outstanding = field;
    }

    pub fn loan_type(&self) -> Option<LoanType> {
        self.profile.loan_type
    }

    /// Unset fields in the fixed slot order
    pub fn missing_fields(&self) -> Vec<ProfileField> {
        self.profile.missing_fields()
    }

    /// Merge extracted fields and return those that changed.
    ///
    /// A set field keeps its value; repeating or contradicting an answer is a
    /// no-op. That includes the loan type: see [`Self::switch_loan_type`].
    pub fn update(&mut self, extracted: &FinancialProfile) -> Vec<ProfileField> {
        let changed = self.profile.merge(extracted);
        self.clear_answered();
        changed
    }

    /// Replace the loan type with one the user named outright.
    ///
    /// Only product names ("car loan") or an answer to the loan type question
    /// should reach this; related terms like "home" or "company" show up in
    /// ordinary answers. Returns true if the loan type changed.
    pub fn switch_loan_type(&mut self, named: LoanType) -> bool {
        if self.profile.loan_type == Some(named) {
            return false;
        }
        if let Some(current) = self.profile.loan_type {
            tracing::debug!(from = %current, to = %named, "Loan type switched");
        }
        self.profile.loan_type = Some(named);
        self.clear_answered();
        true
    }

    fn clear_answered(&mut self) {
        if let Some(outstanding) = self.outstanding {
            if self.profile.is_set(outstanding) {
                self.outstanding = None;
            }
        }
    }

    /// Missing fields the loan type's rule needs, in slot order
    pub fn required_missing(&self, loan_type: LoanType) -> Vec<ProfileField> {
        self.profile
            .missing_among(&catalog::rule(loan_type).required_fields())
    }

    /// True iff every field the loan type's rule needs is present
    pub fn is_complete(&self, loan_type: LoanType) -> bool {
        self.required_missing(loan_type).is_empty()
    }

    /// The single field to ask for next.
    ///
    /// With a known loan type only its rule's fields are asked. Without one,
    /// the general fields come first and the loan type last.
    pub fn next_question(&self) -> Option<ProfileField> {
        match self.profile.loan_type {
            Some(loan_type) => self.required_missing(loan_type).first().copied(),
            None => self.missing_fields().first().copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_assist_core::EmploymentType;

    fn with_age(age: u8) -> FinancialProfile {
        FinancialProfile {
            age: Some(age),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_fields_order() {
        let state = ConversationState::new();
        assert_eq!(state.missing_fields(), ProfileField::ORDER.to_vec());
        assert_eq!(state.next_question(), Some(ProfileField::Age));
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut state = ConversationState::new();
        assert_eq!(state.update(&with_age(32)), vec![ProfileField::Age]);
        let snapshot = state.clone();
        assert!(state.update(&with_age(32)).is_empty());
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_update_never_clears() {
        let mut state = ConversationState::new();
        state.update(&with_age(32));
        state.update(&FinancialProfile::default());
        assert_eq!(state.profile().age, Some(32));
        // A different age does not replace the first answer
        state.update(&with_age(40));
        assert_eq!(state.profile().age, Some(32));
    }

    #[test]
    fn test_loan_type_can_switch() {
        let mut state = ConversationState::new();
        state.update(&FinancialProfile {
            loan_type: Some(LoanType::Home),
            ..Default::default()
        });
        // A merged loan type never replaces the current one
        let changed = state.update(&FinancialProfile {
            loan_type: Some(LoanType::Car),
            ..Default::default()
        });
        assert!(changed.is_empty());
        assert_eq!(state.loan_type(), Some(LoanType::Home));

        assert!(state.switch_loan_type(LoanType::Car));
        assert_eq!(state.loan_type(), Some(LoanType::Car));
        assert!(!state.switch_loan_type(LoanType::Car));
    }

    #[test]
    fn test_outstanding_cleared_when_answered() {
        let mut state = ConversationState::new();
        state.set_outstanding(Some(ProfileField::Age));
        state.update(&with_age(30));
        assert_eq!(state.outstanding(), None);
    }

    #[test]
    fn test_next_question_after_age_is_income() {
        let mut state = ConversationState::new();
        state.update(&with_age(32));
        assert_eq!(state.next_question(), Some(ProfileField::MonthlyIncome));
    }

    #[test]
    fn test_completeness_per_loan_type() {
        let mut state = ConversationState::new();
        state.update(&FinancialProfile {
            age: Some(30),
            loan_type: Some(LoanType::Gold),
            ..Default::default()
        });
        assert!(state.is_complete(LoanType::Gold));
        assert!(!state.is_complete(LoanType::Home));
        assert_eq!(state.next_question(), None);

        assert_eq!(
            state.required_missing(LoanType::Business),
            vec![
                ProfileField::CreditScore,
                ProfileField::EmploymentTenure,
                ProfileField::EmploymentType
            ]
        );

        state.update(&FinancialProfile {
            employment_type: Some(EmploymentType::SelfEmployed),
            ..Default::default()
        });
        assert_eq!(state.profile().employment_type, Some(EmploymentType::SelfEmployed));
    }
}
