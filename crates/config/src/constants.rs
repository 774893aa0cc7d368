//! Centralized constants for the loan advisor
//!
//! Single source of truth for limits and default values. Settings defaults
//! and the static tables refer to these instead of repeating literals.

/// Audio admission limits
pub mod audio {
    /// Hard ceiling on recorded speech per turn (seconds)
    pub const MAX_DURATION_SECS: f64 = 30.0;

    /// Recording sample rate expected from clients
    pub const INPUT_SAMPLE_RATE: u32 = 16_000;
}

/// Speech synthesis limits
pub mod tts {
    /// Longest text sent in one synthesis request
    pub const MAX_CHUNK_CHARS: usize = 450;

    /// Output sample rate requested from the authority
    pub const SAMPLE_RATE: u32 = 22_050;
}

/// Service endpoints
pub mod endpoints {
    /// Sarvam AI REST API
    pub const SARVAM_DEFAULT: &str = "https://api.sarvam.ai";

    /// Ollama LLM endpoint
    pub const OLLAMA_DEFAULT: &str = "http://localhost:11434";

    /// OpenAI-compatible chat completions base URL
    pub const OPENAI_DEFAULT: &str = "https://api.openai.com/v1";
}

/// Per-call timeouts (milliseconds)
pub mod timeouts {
    pub const LANGUAGE_SERVICE_MS: u64 = 30_000;
    pub const LLM_MS: u64 = 15_000;
}

/// Vendor model identifiers
pub mod models {
    pub const TRANSLATE: &str = "mayura:v1";
    pub const SPEECH_TO_TEXT: &str = "saarika:v2";
    pub const TEXT_TO_SPEECH: &str = "bulbul:v1";
}

/// Session lifecycle defaults
pub mod sessions {
    pub const MAX_SESSIONS: usize = 1_000;
    /// Idle time after which a session is discarded (seconds)
    pub const IDLE_TIMEOUT_SECS: u64 = 3_600;
    pub const CLEANUP_INTERVAL_SECS: u64 = 300;
}

/// Credit score bounds accepted by the extractor
pub mod credit {
    pub const MIN_SCORE: u16 = 300;
    pub const MAX_SCORE: u16 = 900;
}
