//! Financial profile slot extraction
//!
//! Rule-based extraction of the six profile fields from English text.
//! Text is number-normalized first, then split into clauses so a number is
//! only attributed to a field whose context words share its clause
//! ("salary of 45000 rupees" vs "credit score of 750").
//!
//! When the previous response asked for a specific field, a bare answer
//! ("32", "5 years", "750") is attributed to that field.
//!
//! Static patterns are compiled once using `once_cell::sync::Lazy`.

use once_cell::sync::Lazy;
use regex::Regex;

use loan_assist_config::constants::credit;
use loan_assist_core::{EmploymentType, FinancialProfile, LoanType, ProfileField};

use crate::intent::LoanTypeMatcher;
use crate::numbers::normalize_numbers;

/// Amount multiplier for parsing
#[derive(Debug, Clone, Copy, PartialEq)]
enum AmountMultiplier {
    Unit,
    Thousand,
    Lakh,
    Crore,
}

impl AmountMultiplier {
    fn value(&self) -> f64 {
        match self {
            AmountMultiplier::Unit => 1.0,
            AmountMultiplier::Thousand => 1_000.0,
            AmountMultiplier::Lakh => 100_000.0,
            AmountMultiplier::Crore => 10_000_000.0,
        }
    }

    fn parse(suffix: &str) -> Self {
        match suffix {
            "k" | "thousand" => AmountMultiplier::Thousand,
            s if s.starts_with("lakh") || s.starts_with("lac") || s == "lpa" || s == "l" => {
                AmountMultiplier::Lakh
            }
            s if s.starts_with("cr") => AmountMultiplier::Crore,
            _ => AmountMultiplier::Unit,
        }
    }
}

// Clause boundaries: sentence punctuation, ", " and " and "
static CLAUSE_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[;!?]|\.(?:\s|$)|\.\.+|,\s|\band\b|\bbut\b").unwrap());

// Age patterns
static AGE_YEARS_OLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,3})\s*(?:years?|yrs?)[\s-]*old\b").unwrap());
static AGE_LABELLED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:age|aged)\s*(?:is|of|:)?\s*(\d{1,3})\b").unwrap());
static AGE_I_AM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:i am|i'm|im)\s+(\d{1,3})\s*(?:years?|yrs?)?\s*(?:old)?\s*$").unwrap()
});

// Income patterns
static INCOME_CONTEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\b(?:salary|salaries|income|earn\w*|make|making|take home|ctc|per month|monthly|a month|per annum|annual\w*|yearly|per year|a year|lpa|rs|inr|rupees?)\b|₹)")
        .unwrap()
});
static ANNUAL_CONTEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:per annum|annual\w*|yearly|per year|a year|p\.?a|lpa|ctc)\b").unwrap()
});
static AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*(k|thousand|lakhs?|lacs?|lpa|l|crores?|cr)?\b").unwrap()
});
static YEARS_AFTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:years?|yrs?|months?)\b").unwrap());

// Credit score patterns
static CREDIT_CONTEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:credit|score|cibil)\b").unwrap());
static THREE_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{3})\b").unwrap());

// Tenure patterns
static TENURE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"\b(?:for|since)\s+(?:the\s+)?(?:last|past)\s+(\d+(?:\.\d+)?)\s*(years?|yrs?|months?)\b").unwrap(),
        Regex::new(r"\b(\d+(?:\.\d+)?)\s*(years?|yrs?|months?)\s+(?:of\s+)?(?:work\s+|job\s+|business\s+)?(?:experience|employment|service|tenure|vintage)\b").unwrap(),
        Regex::new(r"\b(?:working|worked|employed|employee|job|business|been|running|experience)\b[^.]*?\b(?:for\s+)?(?:the\s+)?(?:last\s+|past\s+)?(\d+(?:\.\d+)?)\s*(years?|yrs?|months?)\b").unwrap(),
    ]
});
static BARE_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*(years?|yrs?|months?)?\s*$").unwrap()
});

// Employment type patterns (self-employed checked first; "employed" is a substring)
static SELF_EMPLOYED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:self[\s-]?employed|own (?:a |my )?(?:business|shop|company)|business ?(?:owner|man|woman)|entrepreneur|freelanc\w*|proprietor|run (?:a|my) (?:business|shop))\b")
        .unwrap()
});
static SALARIED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:salaried|employee|salary|job|employed|work (?:at|for|in)|working (?:at|for|in))\b")
        .unwrap()
});

// Bare answer to "salaried or self-employed?" ("business", "my own", "job")
static BARE_EMPLOYMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:i am |i'm |im |i have |i do )?(?:a |an |my )?(?:(self[\s-]?employed|own business|own|business|self)|(salaried|salary|job|employed|service))(?: person| employee)?$")
        .unwrap()
});

// Bare numeric answer ("32", "750.", "45000 rupees")
static BARE_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:it'?s\s+|it is\s+|my \w+(?: \w+)? is\s+)?(\d+(?:\.\d+)?)\s*(k|thousand|lakhs?|lacs?|l)?\s*(?:rupees|rs|years?|yrs?)?\s*$")
        .unwrap()
});

/// Extracts financial profile fields from English text
#[derive(Debug, Clone, Default)]
pub struct SlotExtractor {
    loan_types: LoanTypeMatcher,
}

impl SlotExtractor {
    pub fn new() -> Self {
        Self {
            loan_types: LoanTypeMatcher::new(),
        }
    }

    /// Extract every recognizable field.
    ///
    /// `expected` is the field the previous response asked for; a bare
    /// answer is attributed to it.
    pub fn extract(&self, utterance: &str, expected: Option<ProfileField>) -> FinancialProfile {
        let text = normalize_numbers(&utterance.to_lowercase())
            .trim_end_matches(['.', '!', '?'])
            .to_string();
        let clauses: Vec<&str> = CLAUSE_SPLIT
            .split(&text)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect();

        let mut profile = FinancialProfile {
            age: self.extract_age(&clauses),
            monthly_income: self.extract_monthly_income(&clauses),
            credit_score: self.extract_credit_score(&clauses),
            employment_tenure_years: self.extract_tenure(&clauses),
            employment_type: self.extract_employment_type(&text),
            loan_type: self.loan_types.detect(&text),
        };

        if let Some(field) = expected {
            if !profile.is_set(field) {
                self.fill_bare_answer(&mut profile, field, &text);
            }
        }

        // "business" answering the employment question is not a product
        if expected == Some(ProfileField::EmploymentType) && BARE_EMPLOYMENT.is_match(&text) {
            profile.loan_type = self.loan_types.detect_named(&text);
        }

        tracing::debug!(
            fields = ?profile.present_fields(),
            expected = ?expected,
            "Extracted profile slots"
        );

        profile
    }

    /// Loan type named by product name, ignoring related terms
    pub fn named_loan_type(&self, utterance: &str) -> Option<LoanType> {
        self.loan_types.detect_named(utterance)
    }

    /// Extract age in years (18-100)
    pub fn extract_age(&self, clauses: &[&str]) -> Option<u8> {
        for clause in clauses {
            for pattern in [&*AGE_YEARS_OLD, &*AGE_LABELLED, &*AGE_I_AM] {
                if let Some(age) = pattern
                    .captures(clause)
                    .and_then(|c| c.get(1))
                    .and_then(|m| m.as_str().parse::<u8>().ok())
                    .filter(|age| (18..=100).contains(age))
                {
                    return Some(age);
                }
            }
        }
        None
    }

    /// Extract monthly income in rupees; annual amounts are divided by 12
    pub fn extract_monthly_income(&self, clauses: &[&str]) -> Option<u64> {
        for clause in clauses {
            if !INCOME_CONTEXT.is_match(clause) || CREDIT_CONTEXT.is_match(clause) {
                continue;
            }
            if let Some(amount) = first_amount(clause) {
                let monthly = if ANNUAL_CONTEXT.is_match(clause) {
                    amount / 12.0
                } else {
                    amount
                };
                return Some(monthly.round() as u64);
            }
        }
        None
    }

    /// Extract a credit score (300-900) from a clause mentioning credit/score/CIBIL
    pub fn extract_credit_score(&self, clauses: &[&str]) -> Option<u16> {
        clauses
            .iter()
            .copied()
            .filter(|clause| CREDIT_CONTEXT.is_match(clause))
            .flat_map(|clause| THREE_DIGITS.captures_iter(clause))
            .filter_map(|caps| caps.get(1)?.as_str().parse::<u16>().ok())
            .find(|score| is_credit_score(*score))
    }

    /// Extract employment tenure in years
    pub fn extract_tenure(&self, clauses: &[&str]) -> Option<f32> {
        for clause in clauses {
            if AGE_YEARS_OLD.is_match(clause) {
                continue;
            }
            for pattern in TENURE_PATTERNS.iter() {
                if let Some(caps) = pattern.captures(clause) {
                    if let Some(years) = duration_years(caps.get(1), caps.get(2)) {
                        return Some(years);
                    }
                }
            }
        }
        None
    }

    /// Extract salaried vs self-employed
    pub fn extract_employment_type(&self, text: &str) -> Option<EmploymentType> {
        if SELF_EMPLOYED.is_match(text) {
            Some(EmploymentType::SelfEmployed)
        } else if SALARIED.is_match(text) {
            Some(EmploymentType::Salaried)
        } else {
            None
        }
    }

    fn fill_bare_answer(&self, profile: &mut FinancialProfile, field: ProfileField, text: &str) {
        let bare = BARE_NUMBER.captures(text).and_then(|caps| {
            let value = caps.get(1)?.as_str().parse::<f64>().ok()?;
            let multiplier = caps
                .get(2)
                .map(|m| AmountMultiplier::parse(m.as_str()))
                .unwrap_or(AmountMultiplier::Unit);
            Some((value, multiplier))
        });

        match field {
            ProfileField::Age => {
                profile.age = bare
                    .filter(|(_, m)| *m == AmountMultiplier::Unit)
                    .map(|(v, _)| v)
                    .filter(|v| v.fract() == 0.0 && (18.0..=100.0).contains(v))
                    .map(|v| v as u8);
            }
            ProfileField::MonthlyIncome => {
                profile.monthly_income = bare
                    .map(|(v, m)| v * m.value())
                    .filter(|v| *v >= 1_000.0)
                    .map(|v| v.round() as u64)
                    .or_else(|| first_amount(text).map(|v| v.round() as u64));
            }
            ProfileField::CreditScore => {
                profile.credit_score = bare
                    .filter(|(v, m)| *m == AmountMultiplier::Unit && v.fract() == 0.0)
                    .map(|(v, _)| v as u16)
                    .filter(|s| is_credit_score(*s));
            }
            ProfileField::EmploymentTenure => {
                profile.employment_tenure_years = BARE_DURATION
                    .captures(text)
                    .and_then(|caps| duration_years(caps.get(1), caps.get(2)));
            }
            ProfileField::EmploymentType => {
                profile.employment_type = BARE_EMPLOYMENT.captures(text).map(|caps| {
                    if caps.get(1).is_some() {
                        EmploymentType::SelfEmployed
                    } else {
                        EmploymentType::Salaried
                    }
                });
            }
            // Matched from free text above; nothing bare to fall back to
            ProfileField::LoanType => {}
        }
    }
}

fn is_credit_score(score: u16) -> bool {
    (credit::MIN_SCORE..=credit::MAX_SCORE).contains(&score)
}

/// First plausible rupee amount in a clause.
///
/// Bare numbers below 1000 and numbers followed by a time unit are skipped
/// so ages and tenures in the same clause are not taken for income.
fn first_amount(clause: &str) -> Option<f64> {
    for caps in AMOUNT.captures_iter(clause) {
        let (Some(number), whole) = (caps.get(1), caps.get(0)) else {
            continue;
        };
        let Ok(value) = number.as_str().parse::<f64>() else {
            continue;
        };
        let rest = whole.map(|w| &clause[w.end()..]).unwrap_or_default();
        if YEARS_AFTER.is_match(rest) {
            continue;
        }

        let multiplier = caps
            .get(2)
            .map(|m| AmountMultiplier::parse(m.as_str()))
            .unwrap_or(AmountMultiplier::Unit);
        let amount = value * multiplier.value();

        if multiplier == AmountMultiplier::Unit && amount < 1_000.0 {
            continue;
        }
        return Some(amount);
    }
    None
}

fn duration_years(value: Option<regex::Match<'_>>, unit: Option<regex::Match<'_>>) -> Option<f32> {
    let value = value?.as_str().parse::<f32>().ok()?;
    let years = match unit.map(|u| u.as_str()) {
        Some(u) if u.starts_with("month") => value / 12.0,
        _ => value,
    };
    (years > 0.0 && years <= 60.0).then_some(years)
}
