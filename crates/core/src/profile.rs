//! Financial profile and loan product identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// One slot of the financial profile.
///
/// The declaration order is the fixed slot-filling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Age,
    MonthlyIncome,
    CreditScore,
    EmploymentTenure,
    EmploymentType,
    LoanType,
}

impl ProfileField {
    /// All fields in slot-filling order
    pub const ORDER: [ProfileField; 6] = [
        ProfileField::Age,
        ProfileField::MonthlyIncome,
        ProfileField::CreditScore,
        ProfileField::EmploymentTenure,
        ProfileField::EmploymentType,
        ProfileField::LoanType,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::MonthlyIncome => "monthly income",
            Self::CreditScore => "credit score",
            Self::EmploymentTenure => "employment tenure",
            Self::EmploymentType => "employment type",
            Self::LoanType => "loan type",
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Loan products the assistant knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    Home,
    Personal,
    Education,
    Business,
    Car,
    Gold,
    Agriculture,
    Microfinance,
    CreditCard,
}

impl LoanType {
    pub fn all() -> &'static [LoanType] {
        &[
            Self::Home,
            Self::Personal,
            Self::Education,
            Self::Business,
            Self::Car,
            Self::Gold,
            Self::Agriculture,
            Self::Microfinance,
            Self::CreditCard,
        ]
    }

    /// Stable identifier ("credit_card")
    pub fn id(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Personal => "personal",
            Self::Education => "education",
            Self::Business => "business",
            Self::Car => "car",
            Self::Gold => "gold",
            Self::Agriculture => "agriculture",
            Self::Microfinance => "microfinance",
            Self::CreditCard => "credit_card",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Home => "Home Loan",
            Self::Personal => "Personal Loan",
            Self::Education => "Education Loan",
            Self::Business => "Business Loan",
            Self::Car => "Car Loan",
            Self::Gold => "Gold Loan",
            Self::Agriculture => "Agriculture Loan",
            Self::Microfinance => "Microfinance Loan",
            Self::CreditCard => "Credit Card",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Self::all().iter().copied().find(|t| t.id() == id)
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    Salaried,
    SelfEmployed,
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Salaried => f.write_str("salaried"),
            Self::SelfEmployed => f.write_str("self-employed"),
        }
    }
}

/// What the user has told us so far. Every field is optional until filled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    /// Monthly income in rupees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<u16>,
    /// Years with the current employer or in business
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_tenure_years: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<EmploymentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_type: Option<LoanType>,
}

impl FinancialProfile {
    pub fn is_set(&self, field: ProfileField) -> bool {
        match field {
            ProfileField::Age => self.age.is_some(),
            ProfileField::MonthlyIncome => self.monthly_income.is_some(),
            ProfileField::CreditScore => self.credit_score.is_some(),
            ProfileField::EmploymentTenure => self.employment_tenure_years.is_some(),
            ProfileField::EmploymentType => self.employment_type.is_some(),
            ProfileField::LoanType => self.loan_type.is_some(),
        }
    }

    /// Fields present in this profile, in slot order
    pub fn present_fields(&self) -> Vec<ProfileField> {
        ProfileField::ORDER
            .into_iter()
            .filter(|f| self.is_set(*f))
            .collect()
    }

    /// Unset fields in slot order
    pub fn missing_fields(&self) -> Vec<ProfileField> {
        ProfileField::ORDER
            .into_iter()
            .filter(|f| !self.is_set(*f))
            .collect()
    }

    /// Unset fields among `required`, in slot order
    pub fn missing_among(&self, required: &[ProfileField]) -> Vec<ProfileField> {
        ProfileField::ORDER
            .into_iter()
            .filter(|f| required.contains(f) && !self.is_set(*f))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present_fields().is_empty()
    }

    /// Merge newly extracted values.
    ///
    /// Only fills fields that are still unset; a set field is never replaced.
    /// Returns the fields that became set.
    pub fn merge(&mut self, update: &FinancialProfile) -> Vec<ProfileField> {
        let mut filled = Vec::new();

        fill(&mut self.age, update.age, ProfileField::Age, &mut filled);
        fill(&mut self.monthly_income, update.monthly_income, ProfileField::MonthlyIncome, &mut filled);
        fill(&mut self.credit_score, update.credit_score, ProfileField::CreditScore, &mut filled);
        fill(
            &mut self.employment_tenure_years,
            update.employment_tenure_years,
            ProfileField::EmploymentTenure,
            &mut filled,
        );
        fill(&mut self.employment_type, update.employment_type, ProfileField::EmploymentType, &mut filled);
        fill(&mut self.loan_type, update.loan_type, ProfileField::LoanType, &mut filled);

        filled
    }
}

fn fill<T: Copy>(slot: &mut Option<T>, value: Option<T>, field: ProfileField, filled: &mut Vec<ProfileField>) {
    if slot.is_none() {
        if let Some(v) = value {
            *slot = Some(v);
            filled.push(field);
        }
    }
}
