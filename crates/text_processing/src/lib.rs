//! Text processing on normalized (English) user input
//!
//! This crate provides:
//! - **Intent Routing**: closed four-way classification by keyword sets
//! - **Loan Type Matching**: product names and related terms in free text
//! - **Slot Extraction**: financial profile fields from free text
//! - **Number Words**: "five years" becomes "5 years" before extraction
//!
//! Everything here is synchronous and pure; inputs are already translated
//! to the pivot language.
//!
//! # Example
//!
//! ```ignore
//! use loan_assist_text_processing::{IntentRouter, SlotExtractor};
//!
//! let router = IntentRouter::new();
//! let intent = router.route("Am I eligible for a home loan?", None);
//!
//! let extractor = SlotExtractor::new();
//! let profile = extractor.extract("I am 32 years old", None);
//! assert_eq!(profile.age, Some(32));
//! ```

pub mod intent;
pub mod numbers;
pub mod slot_extraction;

pub use intent::{IntentRouter, LoanTypeMatcher};
pub use slot_extraction::SlotExtractor;
