//! Core traits and types for the loan advisor
//!
//! This crate provides foundational types used across all other crates:
//! - Language definitions (the ten supported Indian locales)
//! - Financial profile, loan and employment types
//! - Eligibility verdict types
//! - Conversation types (turns, intents, dialogue states)
//! - Core traits for the language authority and the LLM
//! - Error types

pub mod audio;
pub mod conversation;
pub mod eligibility;
pub mod error;
pub mod language;
pub mod profile;
pub mod traits;

pub use audio::{AudioClip, Transcript};
pub use conversation::{DialogueState, Intent, Modality, RawInput, Turn, TurnFailure};
pub use eligibility::{Decision, EligibilityVerdict};
pub use error::{Error, Result};
pub use language::{LanguageCode, Script, PIVOT_LANGUAGE};
pub use profile::{EmploymentType, FinancialProfile, LoanType, ProfileField};

pub use traits::{LanguageAuthority, LanguageModel, RawTranscript};
