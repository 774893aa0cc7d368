//! Language authority trait

use async_trait::async_trait;

use crate::{AudioClip, LanguageCode, Result};

/// Raw speech recognition result, before the language code is validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTranscript {
    pub text: String,
    /// Locale tag reported by the authority, if any
    pub language_code: Option<String>,
}

/// The single external authority for every language operation.
///
/// Implementations:
/// - `SarvamClient` - Sarvam AI REST API
/// - `ScriptedAuthority` - in-process double (behind the `test-util` feature)
///
/// Implementations perform exactly one vendor call per method and report
/// failures with the matching error variant (`Error::Translation` for
/// `translate`, and so on). They do not validate language codes; that happens
/// in `LanguageService`, which is also the only caller.
///
/// # Example
///
/// ```ignore
/// let authority: Arc<dyn LanguageAuthority> = Arc::new(SarvamClient::new(config)?);
/// let english = authority
///     .translate("ನನಗೆ ಗೃಹ ಸಾಲ ಬೇಕು", LanguageCode::Kannada, LanguageCode::English)
///     .await?;
/// // "I need a home loan"
/// ```
#[async_trait]
pub trait LanguageAuthority: Send + Sync + 'static {
    /// Identify the language of `text`, returning the vendor's locale tag
    async fn detect_language(&self, text: &str) -> Result<String>;

    /// Translate between two locales
    async fn translate(
        &self,
        text: &str,
        source: LanguageCode,
        target: LanguageCode,
    ) -> Result<String>;

    /// Render already-translated text in the native script of `target`
    async fn transliterate(&self, text: &str, target: LanguageCode) -> Result<String>;

    /// Transcribe recorded speech
    async fn speech_to_text(&self, audio: &AudioClip) -> Result<RawTranscript>;

    /// Synthesize speech, returning WAV bytes
    async fn text_to_speech(&self, text: &str, language: LanguageCode) -> Result<Vec<u8>>;

    /// Authority name for logging
    fn name(&self) -> &str;
}
