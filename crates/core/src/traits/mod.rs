//! Core traits for the loan advisor
//!
//! External collaborators sit behind these traits so they can be swapped
//! for test doubles:
//!
//! ```text
//! Language:
//!   - LanguageAuthority: the single translation / transliteration / speech vendor
//!
//! Language Models:
//!   - LanguageModel: optional text completion used to elaborate tips
//! ```

mod language;
mod llm;

pub use language::{LanguageAuthority, RawTranscript};
pub use llm::LanguageModel;
