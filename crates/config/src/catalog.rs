//! Loan product catalog
//!
//! Static, immutable after first access. Holds product descriptions, the
//! eligibility rule for each product, the related terms used to recognize a
//! product in free text, and the application steps rendered for guidance.

use std::collections::HashMap;

use loan_assist_core::{EmploymentType, LoanType, ProfileField};
use once_cell::sync::Lazy;

/// Descriptive data for one loan product
#[derive(Debug, Clone)]
pub struct LoanProduct {
    pub loan_type: LoanType,
    pub description: &'static str,
    /// Human-readable eligibility summary
    pub eligibility: &'static str,
    pub interest_rate_range: &'static str,
    pub processing_fee: &'static str,
    pub loan_amount_range: &'static str,
    pub tenure_range: &'static str,
    pub documents_required: &'static [&'static str],
    pub benefits: &'static [&'static str],
    pub popular_lenders: &'static [&'static str],
    /// Lowercase terms that point at this product in free text
    pub related_terms: &'static [&'static str],
}

impl LoanProduct {
    pub fn name(&self) -> &'static str {
        self.loan_type.display_name()
    }
}

/// Inclusive age bounds; `max` of `None` means no upper limit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeBounds {
    pub min: u8,
    pub max: Option<u8>,
}

impl AgeBounds {
    pub fn contains(&self, age: u8) -> bool {
        age >= self.min && self.max.map_or(true, |max| age <= max)
    }

    pub fn describe(&self) -> String {
        match self.max {
            Some(max) => format!("{}-{}", self.min, max),
            None => format!("{}+", self.min),
        }
    }
}

/// Threshold rule evaluated against a financial profile.
///
/// Each `Some` threshold is one criterion; its field becomes required.
#[derive(Debug, Clone)]
pub struct EligibilityRule {
    pub loan_type: LoanType,
    pub age: AgeBounds,
    pub min_monthly_income: Option<u64>,
    pub min_credit_score: Option<u16>,
    pub min_tenure_years: Option<f32>,
    pub employment_type: Option<EmploymentType>,
    pub income_suggestion: &'static str,
    pub credit_suggestion: &'static str,
    pub tenure_suggestion: &'static str,
    pub employment_suggestion: &'static str,
}

impl EligibilityRule {
    /// Fields the rule reads, in slot-filling order
    pub fn required_fields(&self) -> Vec<ProfileField> {
        let mut fields = vec![ProfileField::Age];
        if self.min_monthly_income.is_some() {
            fields.push(ProfileField::MonthlyIncome);
        }
        if self.min_credit_score.is_some() {
            fields.push(ProfileField::CreditScore);
        }
        if self.min_tenure_years.is_some() {
            fields.push(ProfileField::EmploymentTenure);
        }
        if self.employment_type.is_some() {
            fields.push(ProfileField::EmploymentType);
        }
        fields
    }

    pub fn age_suggestion(&self) -> String {
        format!(
            "You must be {} years old to apply for a {}.",
            match self.age.max {
                Some(max) => format!("between {}-{}", self.age.min, max),
                None => format!("at least {}", self.age.min),
            },
            self.loan_type.display_name().to_lowercase()
        )
    }
}

/// One step of the application walkthrough
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationStep {
    pub title: &'static str,
    pub details: Vec<String>,
}

const DEFAULT_INCOME_SUGGESTION: &str =
    "Consider adding a co-applicant to increase the household income.";
const DEFAULT_CREDIT_SUGGESTION: &str =
    "Work on improving your credit score by paying bills on time and reducing existing debt.";
const DEFAULT_TENURE_SUGGESTION: &str =
    "Lenders prefer a stable work history. Consider applying after completing more time with your current employer.";
const DEFAULT_EMPLOYMENT_SUGGESTION: &str =
    "Business loans are primarily for business owners. Consider a personal loan instead.";

static PRODUCTS: Lazy<Vec<LoanProduct>> = Lazy::new(|| {
    vec![
        LoanProduct {
            loan_type: LoanType::Home,
            description: "Loans for purchasing, constructing, or renovating residential property.",
            eligibility: "Indian resident, Age 21-65, Minimum income: ₹25,000/month, Good credit score (700+)",
            interest_rate_range: "6.5% - 9.5% per annum",
            processing_fee: "0.5% - 1% of loan amount",
            loan_amount_range: "₹10 lakhs - ₹5 crores",
            tenure_range: "5 - 30 years",
            documents_required: &[
                "Identity proof (Aadhaar, PAN)",
                "Address proof",
                "Income proof (Salary slips, ITR)",
                "Property documents",
                "Bank statements (6 months)",
            ],
            benefits: &[
                "Tax benefits under Section 80C and 24(b)",
                "Lower interest rates compared to personal loans",
                "Long repayment tenure",
                "Option for balance transfer",
            ],
            popular_lenders: &[
                "State Bank of India",
                "HDFC Bank",
                "ICICI Bank",
                "Axis Bank",
                "LIC Housing Finance",
            ],
            related_terms: &["house", "flat", "apartment", "property", "real estate", "home"],
        },
        LoanProduct {
            loan_type: LoanType::Personal,
            description: "Unsecured loans for personal expenses like medical emergencies, travel, or debt consolidation.",
            eligibility: "Indian resident, Age 21-60, Minimum income: ₹20,000/month, Credit score (650+)",
            interest_rate_range: "10.5% - 18% per annum",
            processing_fee: "1% - 3% of loan amount",
            loan_amount_range: "₹50,000 - ₹40 lakhs",
            tenure_range: "1 - 5 years",
            documents_required: &[
                "Identity proof (Aadhaar, PAN)",
                "Address proof",
                "Income proof (Salary slips, ITR)",
                "Bank statements (3 months)",
            ],
            benefits: &[
                "No collateral required",
                "Quick disbursement (24-72 hours)",
                "Flexible usage",
                "Minimal documentation",
            ],
            popular_lenders: &[
                "HDFC Bank",
                "ICICI Bank",
                "Bajaj Finserv",
                "Tata Capital",
                "State Bank of India",
            ],
            related_terms: &["personal", "emergency", "medical", "wedding", "travel", "vacation"],
        },
        LoanProduct {
            loan_type: LoanType::Education,
            description: "Loans for higher education expenses in India or abroad.",
            eligibility: "Indian resident, Admission to recognized institution, Co-applicant (parent/guardian)",
            interest_rate_range: "7.5% - 14% per annum",
            processing_fee: "0% - 1% of loan amount",
            loan_amount_range: "Up to ₹75 lakhs for abroad, Up to ₹20 lakhs for India",
            tenure_range: "5 - 15 years",
            documents_required: &[
                "Identity proof (Aadhaar, PAN)",
                "Address proof",
                "Admission letter",
                "Course fee structure",
                "Academic records",
                "Co-applicant documents",
            ],
            benefits: &[
                "Tax benefits under Section 80E",
                "Moratorium period during study",
                "Collateral not required for loans up to ₹7.5 lakhs",
                "Covers tuition, accommodation, and other expenses",
            ],
            popular_lenders: &[
                "State Bank of India",
                "Bank of Baroda",
                "Canara Bank",
                "HDFC Credila",
                "Axis Bank",
            ],
            related_terms: &["education", "study", "college", "university", "school", "course", "degree"],
        },
        LoanProduct {
            loan_type: LoanType::Business,
            description: "Loans for starting or expanding business operations, working capital, or equipment purchase.",
            eligibility: "Business age: 2+ years, Minimum annual turnover: ₹10 lakhs, Good credit score (700+)",
            interest_rate_range: "11% - 16% per annum",
            processing_fee: "1% - 3% of loan amount",
            loan_amount_range: "₹5 lakhs - ₹5 crores",
            tenure_range: "1 - 7 years",
            documents_required: &[
                "Business registration documents",
                "GST registration",
                "Income Tax Returns (2 years)",
                "Bank statements (6 months)",
                "Business financial statements",
            ],
            benefits: &[
                "Collateral not required for smaller amounts",
                "Flexible repayment options",
                "Quick disbursement",
                "Tax benefits on interest paid",
            ],
            popular_lenders: &[
                "HDFC Bank",
                "ICICI Bank",
                "State Bank of India",
                "Bajaj Finserv",
                "Tata Capital",
            ],
            related_terms: &["business", "startup", "entrepreneur", "company", "enterprise", "shop"],
        },
        LoanProduct {
            loan_type: LoanType::Car,
            description: "Loans for purchasing new or used cars.",
            eligibility: "Indian resident, Age 21-65, Minimum income: ₹20,000/month, Good credit score (650+)",
            interest_rate_range: "7.25% - 12% per annum",
            processing_fee: "0.5% - 1.5% of loan amount",
            loan_amount_range: "Up to 90% of car value (new), Up to 80% of car value (used)",
            tenure_range: "1 - 7 years",
            documents_required: &[
                "Identity proof (Aadhaar, PAN)",
                "Address proof",
                "Income proof (Salary slips, ITR)",
                "Bank statements (3 months)",
                "Car quotation/invoice",
            ],
            benefits: &[
                "Quick approval and disbursement",
                "Competitive interest rates",
                "Flexible repayment options",
                "Option for balance transfer",
            ],
            popular_lenders: &[
                "HDFC Bank",
                "ICICI Bank",
                "State Bank of India",
                "Axis Bank",
                "Tata Capital",
            ],
            related_terms: &["car", "vehicle", "automobile", "four wheeler"],
        },
        LoanProduct {
            loan_type: LoanType::Gold,
            description: "Loans against gold jewelry or ornaments as collateral.",
            eligibility: "Indian resident, Age 21+, Ownership of gold jewelry/ornaments",
            interest_rate_range: "7% - 15% per annum",
            processing_fee: "0% - 1% of loan amount",
            loan_amount_range: "Up to 75% of gold value",
            tenure_range: "3 months - 3 years",
            documents_required: &[
                "Identity proof (Aadhaar, PAN)",
                "Address proof",
                "Gold jewelry/ornaments",
            ],
            benefits: &[
                "Quick disbursement (within hours)",
                "Minimal documentation",
                "No credit score check",
                "Lower interest rates compared to personal loans",
            ],
            popular_lenders: &[
                "Muthoot Finance",
                "Manappuram Finance",
                "State Bank of India",
                "ICICI Bank",
                "HDFC Bank",
            ],
            related_terms: &["gold", "jewelry", "jewellery", "ornament"],
        },
        LoanProduct {
            loan_type: LoanType::Agriculture,
            description: "Loans for farmers and agricultural activities like crop production, equipment purchase, or land development.",
            eligibility: "Farmers, landowners, or agricultural entrepreneurs",
            interest_rate_range: "7% - 12% per annum (with subsidies as low as 4%)",
            processing_fee: "0% - 0.5% of loan amount",
            loan_amount_range: "Varies based on purpose (₹50,000 - ₹50 lakhs)",
            tenure_range: "1 - 15 years (depending on purpose)",
            documents_required: &[
                "Identity proof (Aadhaar, PAN)",
                "Address proof",
                "Land records",
                "Crop details",
                "Bank statements",
            ],
            benefits: &[
                "Subsidized interest rates under government schemes",
                "Flexible repayment aligned with harvest cycles",
                "Kisan Credit Card facility",
                "Insurance coverage options",
            ],
            popular_lenders: &[
                "NABARD",
                "State Bank of India",
                "Punjab National Bank",
                "Bank of Baroda",
                "Regional Rural Banks",
            ],
            related_terms: &["farm", "agriculture", "crop", "farming", "tractor"],
        },
        LoanProduct {
            loan_type: LoanType::Microfinance,
            description: "Small loans for low-income individuals, often for small businesses or income-generating activities.",
            eligibility: "Low-income individuals, Often women in rural/semi-urban areas, Group lending model",
            interest_rate_range: "18% - 24% per annum",
            processing_fee: "1% - 2% of loan amount",
            loan_amount_range: "₹10,000 - ₹1 lakh",
            tenure_range: "6 months - 2 years",
            documents_required: &[
                "Identity proof (Aadhaar)",
                "Address proof",
                "Group formation documents (if applicable)",
            ],
            benefits: &[
                "No collateral required",
                "Weekly/bi-weekly repayment options",
                "Financial inclusion for underserved populations",
                "Access to subsequent larger loans with good repayment history",
            ],
            popular_lenders: &[
                "Bandhan Bank",
                "Ujjivan Small Finance Bank",
                "Satin Creditcare",
                "Spandana Sphoorty",
                "Arohan Financial Services",
            ],
            related_terms: &["micro", "small business", "self help group", "shg", "women entrepreneur"],
        },
        LoanProduct {
            loan_type: LoanType::CreditCard,
            description: "Revolving credit facility for purchases and cash advances.",
            eligibility: "Indian resident, Age 21-65, Minimum income: ₹15,000/month, Good credit score (650+)",
            interest_rate_range: "24% - 42% per annum on outstanding balance",
            processing_fee: "₹0 - ₹1,000 (one-time)",
            loan_amount_range: "Credit limit: ₹20,000 - ₹10 lakhs (based on profile)",
            tenure_range: "Revolving credit with minimum monthly payments",
            documents_required: &[
                "Identity proof (Aadhaar, PAN)",
                "Address proof",
                "Income proof (Salary slips, ITR)",
                "Bank statements (3 months)",
            ],
            benefits: &[
                "Interest-free period (up to 50 days)",
                "Reward points and cashback",
                "EMI conversion facility",
                "Insurance and travel benefits",
                "Discounts and offers",
            ],
            popular_lenders: &[
                "HDFC Bank",
                "SBI Card",
                "ICICI Bank",
                "Axis Bank",
                "American Express",
            ],
            related_terms: &["credit card", "cashback", "reward"],
        },
    ]
});

static PRODUCT_INDEX: Lazy<HashMap<LoanType, usize>> = Lazy::new(|| {
    PRODUCTS
        .iter()
        .enumerate()
        .map(|(i, p)| (p.loan_type, i))
        .collect()
});

static RULES: Lazy<HashMap<LoanType, EligibilityRule>> = Lazy::new(|| {
    let banded = |loan_type, min_age, max_age, income, credit, tenure| EligibilityRule {
        loan_type,
        age: AgeBounds {
            min: min_age,
            max: Some(max_age),
        },
        min_monthly_income: Some(income),
        min_credit_score: Some(credit),
        min_tenure_years: Some(tenure),
        employment_type: None,
        income_suggestion: DEFAULT_INCOME_SUGGESTION,
        credit_suggestion: DEFAULT_CREDIT_SUGGESTION,
        tenure_suggestion: DEFAULT_TENURE_SUGGESTION,
        employment_suggestion: DEFAULT_EMPLOYMENT_SUGGESTION,
    };
    let age_only = |loan_type, min_age| EligibilityRule {
        loan_type,
        age: AgeBounds {
            min: min_age,
            max: None,
        },
        min_monthly_income: None,
        min_credit_score: None,
        min_tenure_years: None,
        employment_type: None,
        income_suggestion: DEFAULT_INCOME_SUGGESTION,
        credit_suggestion: DEFAULT_CREDIT_SUGGESTION,
        tenure_suggestion: DEFAULT_TENURE_SUGGESTION,
        employment_suggestion: DEFAULT_EMPLOYMENT_SUGGESTION,
    };

    let rules = vec![
        banded(LoanType::Home, 21, 65, 25_000, 700, 2.0),
        EligibilityRule {
            income_suggestion: "Look for specialized personal loans with lower income requirements.",
            credit_suggestion: "Consider a secured loan option or improve your credit score.",
            ..banded(LoanType::Personal, 21, 60, 20_000, 650, 1.0)
        },
        banded(LoanType::Car, 21, 65, 20_000, 650, 1.0),
        EligibilityRule {
            income_suggestion: "Start with a secured credit card backed by a fixed deposit.",
            ..banded(LoanType::CreditCard, 21, 65, 15_000, 650, 0.5)
        },
        EligibilityRule {
            min_monthly_income: None,
            employment_type: Some(EmploymentType::SelfEmployed),
            tenure_suggestion: "Most lenders require at least 2 years of business operations. Consider a microfinance loan in the meantime.",
            ..banded(LoanType::Business, 21, 65, 0, 700, 2.0)
        },
        age_only(LoanType::Education, 18),
        age_only(LoanType::Gold, 21),
        age_only(LoanType::Agriculture, 18),
        age_only(LoanType::Microfinance, 18),
    ];

    rules.into_iter().map(|r| (r.loan_type, r)).collect()
});

/// Catalog entry for a loan type
pub fn product(loan_type: LoanType) -> &'static LoanProduct {
    // Every LoanType variant has an entry
    &PRODUCTS[PRODUCT_INDEX[&loan_type]]
}

/// All products in catalog order
pub fn products() -> &'static [LoanProduct] {
    &PRODUCTS
}

/// Eligibility rule for a loan type
pub fn rule(loan_type: LoanType) -> &'static EligibilityRule {
    &RULES[&loan_type]
}

/// Six-step application walkthrough for a product
pub fn application_steps(loan_type: LoanType) -> Vec<ApplicationStep> {
    let product = product(loan_type);

    vec![
        ApplicationStep {
            title: "Check Your Eligibility",
            details: vec![format!("Make sure you meet the basic criteria: {}", product.eligibility)],
        },
        ApplicationStep {
            title: "Prepare Documents",
            details: product
                .documents_required
                .iter()
                .map(|d| d.to_string())
                .collect(),
        },
        ApplicationStep {
            title: "Compare Lenders",
            details: product
                .popular_lenders
                .iter()
                .take(3)
                .map(|l| l.to_string())
                .collect(),
        },
        ApplicationStep {
            title: "Application Process",
            details: vec![
                "Complete the application form (online or at branch)".to_string(),
                "Submit all required documents".to_string(),
                format!("Pay the processing fee ({})", product.processing_fee),
                "Undergo credit assessment".to_string(),
            ],
        },
        ApplicationStep {
            title: "Verification",
            details: vec![
                "The lender will verify your documents".to_string(),
                "For secured loans, property/asset valuation will be done".to_string(),
            ],
        },
        ApplicationStep {
            title: "Approval & Disbursement",
            details: vec![
                "After approval, review the loan agreement carefully".to_string(),
                "Sign the loan agreement".to_string(),
                "The amount will be disbursed to your account".to_string(),
            ],
        },
    ]
}
