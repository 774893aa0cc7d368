//! Loan eligibility evaluation
//!
//! [`EligibilityEngine::evaluate`] is a pure function of the profile and the
//! product's rule from the catalog. An incomplete profile yields
//! `InsufficientInformation` naming exactly the missing required fields; it
//! is never an error.

mod format;

pub use format::{format_rupees, format_years};

use loan_assist_config::{catalog, EligibilityRule};
use loan_assist_core::{Decision, EligibilityVerdict, FinancialProfile, LoanType, ProfileField};

/// Outcome of one criterion
struct Criterion {
    passed: bool,
    reason: String,
    suggestion: Option<String>,
}

impl Criterion {
    fn pass(reason: String) -> Self {
        Self {
            passed: true,
            reason,
            suggestion: None,
        }
    }

    fn fail(reason: String, suggestion: impl Into<String>) -> Self {
        Self {
            passed: false,
            reason,
            suggestion: Some(suggestion.into()),
        }
    }
}

/// Stateless rule evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct EligibilityEngine;

impl EligibilityEngine {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate a profile against one loan product
    pub fn evaluate(&self, profile: &FinancialProfile, loan_type: LoanType) -> EligibilityVerdict {
        let rule = catalog::rule(loan_type);
        let missing = profile.missing_among(&rule.required_fields());

        if !missing.is_empty() {
            tracing::debug!(loan_type = %loan_type, missing = ?missing, "Insufficient information");
            let labels: Vec<&str> = missing.iter().map(ProfileField::label).collect();
            return EligibilityVerdict {
                loan_type,
                decision: Decision::InsufficientInformation,
                reasons: vec![format!(
                    "To check a {} I still need your {}.",
                    loan_type.display_name(),
                    labels.join(", ")
                )],
                suggestions: Vec::new(),
                missing_fields: missing,
            };
        }

        let criteria = Self::criteria(rule, profile);
        let eligible = criteria.iter().all(|c| c.passed);
        let decision = if eligible {
            Decision::Eligible
        } else {
            Decision::NotEligible
        };

        tracing::debug!(
            loan_type = %loan_type,
            decision = ?decision,
            failed = criteria.iter().filter(|c| !c.passed).count(),
            "Evaluated eligibility"
        );

        let mut reasons = Vec::with_capacity(criteria.len());
        let mut suggestions = Vec::new();
        for criterion in criteria {
            reasons.push(criterion.reason);
            if let Some(suggestion) = criterion.suggestion {
                if !suggestions.contains(&suggestion) {
                    suggestions.push(suggestion);
                }
            }
        }

        EligibilityVerdict {
            loan_type,
            decision,
            reasons,
            suggestions,
            missing_fields: Vec::new(),
        }
    }

    /// Evaluate every criterion the rule defines, in rule order.
    ///
    /// Only called once every required field is present.
    fn criteria(rule: &EligibilityRule, profile: &FinancialProfile) -> Vec<Criterion> {
        let mut out = Vec::new();

        if let Some(age) = profile.age {
            let range = rule.age.describe();
            out.push(if rule.age.contains(age) {
                Criterion::pass(format!("Age {} meets the {} years requirement.", age, range))
            } else {
                Criterion::fail(
                    format!("Age {} is outside the required {} years.", age, range),
                    rule.age_suggestion(),
                )
            });
        }

        if let (Some(min), Some(income)) = (rule.min_monthly_income, profile.monthly_income) {
            out.push(if income >= min {
                Criterion::pass(format!(
                    "Monthly income of {} meets the {} minimum.",
                    format_rupees(income),
                    format_rupees(min)
                ))
            } else {
                Criterion::fail(
                    format!(
                        "Monthly income of {} is below the {} minimum.",
                        format_rupees(income),
                        format_rupees(min)
                    ),
                    rule.income_suggestion,
                )
            });
        }

        if let (Some(min), Some(score)) = (rule.min_credit_score, profile.credit_score) {
            out.push(if score >= min {
                Criterion::pass(format!("Credit score of {} meets the {}+ requirement.", score, min))
            } else {
                Criterion::fail(
                    format!("Credit score of {} is below the required {}+.", score, min),
                    rule.credit_suggestion,
                )
            });
        }

        if let (Some(min), Some(years)) = (rule.min_tenure_years, profile.employment_tenure_years) {
            let what = if rule.loan_type == LoanType::Business {
                "Time in business"
            } else {
                "Employment tenure"
            };
            out.push(if years >= min {
                Criterion::pass(format!(
                    "{} of {} meets the {} minimum.",
                    what,
                    format_years(years),
                    format_years(min)
                ))
            } else {
                Criterion::fail(
                    format!(
                        "{} of {} is below the {} minimum.",
                        what,
                        format_years(years),
                        format_years(min)
                    ),
                    rule.tenure_suggestion,
                )
            });
        }

        if let (Some(required), Some(actual)) = (rule.employment_type, profile.employment_type) {
            out.push(if required == actual {
                Criterion::pass(format!("Employment type ({}) matches.", actual))
            } else {
                Criterion::fail(
                    format!(
                        "A {} is meant for {} applicants; you are {}.",
                        rule.loan_type.display_name(),
                        required,
                        actual
                    ),
                    rule.employment_suggestion,
                )
            });
        }

        out
    }
}
