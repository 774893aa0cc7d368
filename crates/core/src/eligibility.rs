//! Eligibility verdict types

use serde::{Deserialize, Serialize};

use crate::{LoanType, ProfileField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Eligible,
    NotEligible,
    InsufficientInformation,
}

/// Outcome of evaluating one profile against one loan product.
///
/// Produced fresh for every eligibility request; never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityVerdict {
    pub loan_type: LoanType,
    pub decision: Decision,
    /// One entry per evaluated criterion, in rule order
    pub reasons: Vec<String>,
    /// Improvement suggestions, only for `NotEligible`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    /// Fields the rule needs but the profile lacks, only for `InsufficientInformation`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<ProfileField>,
}

impl EligibilityVerdict {
    pub fn is_eligible(&self) -> bool {
        self.decision == Decision::Eligible
    }
}
