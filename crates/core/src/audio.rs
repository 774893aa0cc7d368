//! Audio payload types

use serde::{Deserialize, Serialize};

use crate::LanguageCode;

/// Recorded user audio with its measured duration
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    /// Encoded audio (WAV)
    pub bytes: Vec<u8>,
    /// Measured duration in seconds
    pub duration_secs: f64,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, duration_secs: f64) -> Self {
        Self { bytes, duration_secs }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Recognized speech with the language it was spoken in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub language: LanguageCode,
}
