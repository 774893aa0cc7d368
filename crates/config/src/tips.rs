//! Financial literacy tip corpora

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipCategory {
    General,
    CreditScore,
    LoanApplication,
    Saving,
}

static GENERAL: &[&str] = &[
    "Maintain an emergency fund with 3-6 months of expenses.",
    "Invest early for retirement, even small amounts can grow significantly over time.",
    "Pay off high-interest debt before investing in low-return instruments.",
    "Review your credit report regularly and dispute any errors.",
    "Automate your savings to ensure consistency.",
    "Follow the 50/30/20 rule: 50% needs, 30% wants, 20% savings/debt repayment.",
    "Consider term insurance for financial protection.",
    "Diversify your investments across different asset classes.",
    "Compare multiple loan options before finalizing one.",
    "Read and understand all terms before signing loan documents.",
];

static CREDIT_SCORE: &[&str] = &[
    "Pay your bills on time to build a good credit history.",
    "Keep your credit card utilization below 30% of your limit.",
    "Don't close old credit accounts, even if unused.",
    "Limit the number of new credit applications.",
    "Check your credit report regularly for errors or fraud.",
];

static LOAN_APPLICATION: &[&str] = &[
    "Gather all required documents before applying to speed up the process.",
    "Don't apply for multiple loans simultaneously as it can hurt your credit score.",
    "Be honest about your financial situation in your application.",
    "Consider a joint loan application to improve eligibility.",
    "Calculate your EMI beforehand to ensure it's within your budget.",
];

static SAVING: &[&str] = &[
    "Set specific financial goals with timelines.",
    "Use automatic transfers to your savings account on payday.",
    "Track your expenses to identify areas where you can cut back.",
    "Consider tax-saving investment options like PPF or ELSS.",
    "Look for high-interest savings accounts or fixed deposits for short-term goals.",
];

/// Context keywords, checked in order; first match wins
static CATEGORY_KEYWORDS: Lazy<Vec<(TipCategory, &'static [&'static str])>> = Lazy::new(|| {
    vec![
        (TipCategory::CreditScore, &["credit", "score", "cibil"][..]),
        (
            TipCategory::LoanApplication,
            &["apply", "application", "document", "loan"][..],
        ),
        (TipCategory::Saving, &["save", "saving", "budget", "money"][..]),
    ]
});

impl TipCategory {
    /// Pick the corpus matching free-text context, defaulting to general
    pub fn for_context(context: &str) -> Self {
        let context = context.to_lowercase();
        CATEGORY_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| context.contains(k)))
            .map(|(category, _)| *category)
            .unwrap_or(TipCategory::General)
    }

    pub fn tips(&self) -> &'static [&'static str] {
        match self {
            Self::General => GENERAL,
            Self::CreditScore => CREDIT_SCORE,
            Self::LoanApplication => LOAN_APPLICATION,
            Self::Saving => SAVING,
        }
    }

    /// Deterministic pick by index, wrapping around the corpus
    pub fn pick(&self, index: usize) -> &'static str {
        let tips = self.tips();
        tips[index % tips.len()]
    }

    pub fn heading(&self) -> &'static str {
        match self {
            Self::General => "Financial tip",
            Self::CreditScore => "Credit score tip",
            Self::LoanApplication => "Loan application tip",
            Self::Saving => "Saving tip",
        }
    }
}
