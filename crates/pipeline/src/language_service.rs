//! Validated, time-bounded language operations
//!
//! `LanguageService` is the only caller of the [`LanguageAuthority`]. It adds
//! what the raw vendor calls lack:
//!
//! - every call bounded by one timeout, mapped to the operation's failure
//! - locale tags validated against the supported set
//! - `normalize` (into the pivot) and `localize` (translate then transliterate
//!   out of it) as single composed operations
//!
//! There is no secondary provider. An authority error fails the operation.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use loan_assist_core::{
    AudioClip, Error, LanguageAuthority, LanguageCode, Result, Transcript, PIVOT_LANGUAGE,
};

use crate::audio_gate::AdmittedAudio;

/// The five authority operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageOperation {
    Detect,
    Translate,
    Transliterate,
    SpeechToText,
    TextToSpeech,
}

impl LanguageOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Detect => "detect",
            Self::Translate => "translate",
            Self::Transliterate => "transliterate",
            Self::SpeechToText => "speech_to_text",
            Self::TextToSpeech => "text_to_speech",
        }
    }

    /// Error reported when this operation fails.
    ///
    /// Detection has no failure kind of its own; it is part of normalizing
    /// the input and fails as a translation.
    pub fn failure(&self, message: impl Into<String>) -> Error {
        let message = message.into();
        match self {
            Self::Detect => Error::Translation(format!("language detection failed: {}", message)),
            Self::Translate => Error::Translation(message),
            Self::Transliterate => Error::Transliteration(message),
            Self::SpeechToText => Error::SpeechRecognition(message),
            Self::TextToSpeech => Error::SpeechSynthesis(message),
        }
    }
}

impl fmt::Display for LanguageOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub struct LanguageService {
    authority: Arc<dyn LanguageAuthority>,
    timeout: Duration,
}

impl fmt::Debug for LanguageService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageService")
            .field("authority", &self.authority.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LanguageService {
    pub fn new(authority: Arc<dyn LanguageAuthority>, timeout: Duration) -> Self {
        Self { authority, timeout }
    }

    pub fn authority_name(&self) -> &str {
        self.authority.name()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one authority call under the timeout
    async fn bounded<T, F>(&self, operation: LanguageOperation, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => {
                if let Err(e) = &result {
                    tracing::warn!(operation = %operation, error = %e, "Language authority call failed");
                }
                result
            }
            Err(_) => {
                tracing::warn!(
                    operation = %operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Language authority call timed out"
                );
                Err(operation.failure(format!("timed out after {} ms", self.timeout.as_millis())))
            }
        }
    }

    /// Identify the language of `text`
    pub async fn detect(&self, text: &str) -> Result<LanguageCode> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::EmptyInput);
        }

        let tag = self
            .bounded(LanguageOperation::Detect, self.authority.detect_language(text))
            .await?;

        let language = tag.parse::<LanguageCode>()?;
        tracing::debug!(language = %language, "Detected input language");
        Ok(language)
    }

    /// Translate between two supported languages.
    ///
    /// Same-language translation is the identity and makes no call.
    pub async fn translate(
        &self,
        text: &str,
        source: LanguageCode,
        target: LanguageCode,
    ) -> Result<String> {
        if text.trim().is_empty() {
            return Err(Error::Translation("empty input".to_string()));
        }
        if source == target {
            return Ok(text.to_string());
        }

        let translated = self
            .bounded(
                LanguageOperation::Translate,
                self.authority.translate(text, source, target),
            )
            .await?;

        if translated.trim().is_empty() {
            return Err(Error::Translation("authority returned empty text".to_string()));
        }
        Ok(translated)
    }

    /// Render translated text in the native script of `target`
    pub async fn transliterate(&self, text: &str, target: LanguageCode) -> Result<String> {
        if text.trim().is_empty() {
            return Err(Error::Transliteration("empty input".to_string()));
        }

        let rendered = self
            .bounded(
                LanguageOperation::Transliterate,
                self.authority.transliterate(text, target),
            )
            .await?;

        if rendered.trim().is_empty() {
            return Err(Error::Transliteration("authority returned empty text".to_string()));
        }
        Ok(rendered)
    }

    /// Bring user text into the pivot language
    pub async fn normalize(&self, text: &str, source: LanguageCode) -> Result<String> {
        if source.is_pivot() {
            return Ok(text.trim().to_string());
        }
        self.translate(text, source, PIVOT_LANGUAGE).await
    }

    /// Deliver English text in `target`: translate, then transliterate.
    ///
    /// Both steps are the identity for the pivot language.
    pub async fn localize(&self, english: &str, target: LanguageCode) -> Result<String> {
        if target.is_pivot() {
            return Ok(english.to_string());
        }

        let translated = self.translate(english, PIVOT_LANGUAGE, target).await?;
        self.transliterate(&translated, target).await
    }

    /// Transcribe admitted speech.
    ///
    /// When the authority reports no language, the transcript itself is
    /// sent to detection.
    pub async fn speech_to_text(&self, audio: &AdmittedAudio) -> Result<Transcript> {
        let clip: &AudioClip = audio.clip();
        let raw = self
            .bounded(
                LanguageOperation::SpeechToText,
                self.authority.speech_to_text(clip),
            )
            .await?;

        let text = raw.text.trim().to_string();
        if text.is_empty() {
            return Err(Error::SpeechRecognition("no speech detected".to_string()));
        }

        let language = match raw.language_code.as_deref().map(str::trim) {
            Some(tag) if !tag.is_empty() && !tag.eq_ignore_ascii_case("unknown") => {
                tag.parse::<LanguageCode>()?
            }
            _ => {
                tracing::debug!("Transcript carried no language code, detecting from text");
                self.detect(&text).await?
            }
        };

        tracing::debug!(
            language = %language,
            duration_secs = clip.duration_secs,
            chars = text.chars().count(),
            "Transcribed speech"
        );
        Ok(Transcript { text, language })
    }

    /// Synthesize speech in `language`, returning WAV bytes
    pub async fn text_to_speech(&self, text: &str, language: LanguageCode) -> Result<Vec<u8>> {
        if text.trim().is_empty() {
            return Err(Error::SpeechSynthesis("empty input".to_string()));
        }

        let audio = self
            .bounded(
                LanguageOperation::TextToSpeech,
                self.authority.text_to_speech(text, language),
            )
            .await?;

        if audio.is_empty() {
            return Err(Error::SpeechSynthesis("authority returned no audio".to_string()));
        }
        Ok(audio)
    }
}
