//! Language definitions for the ten supported locales
//!
//! Every turn is tagged with exactly one of these locale codes. Codes outside
//! this set never enter the pipeline; the language service rejects them with
//! `Error::UnsupportedLanguage`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Pivot language for all domain logic
pub const PIVOT_LANGUAGE: LanguageCode = LanguageCode::English;

/// Supported locale tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LanguageCode {
    #[default]
    #[serde(rename = "en-IN")]
    English,
    #[serde(rename = "hi-IN")]
    Hindi,
    #[serde(rename = "ta-IN")]
    Tamil,
    #[serde(rename = "te-IN")]
    Telugu,
    #[serde(rename = "bn-IN")]
    Bengali,
    #[serde(rename = "kn-IN")]
    Kannada,
    #[serde(rename = "ml-IN")]
    Malayalam,
    #[serde(rename = "pa-IN")]
    Punjabi,
    #[serde(rename = "mr-IN")]
    Marathi,
    #[serde(rename = "gu-IN")]
    Gujarati,
}

impl LanguageCode {
    /// Locale tag as used on the wire (e.g. "kn-IN")
    pub fn as_locale(&self) -> &'static str {
        match self {
            Self::English => "en-IN",
            Self::Hindi => "hi-IN",
            Self::Tamil => "ta-IN",
            Self::Telugu => "te-IN",
            Self::Bengali => "bn-IN",
            Self::Kannada => "kn-IN",
            Self::Malayalam => "ml-IN",
            Self::Punjabi => "pa-IN",
            Self::Marathi => "mr-IN",
            Self::Gujarati => "gu-IN",
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi",
            Self::Tamil => "Tamil",
            Self::Telugu => "Telugu",
            Self::Bengali => "Bengali",
            Self::Kannada => "Kannada",
            Self::Malayalam => "Malayalam",
            Self::Punjabi => "Punjabi",
            Self::Marathi => "Marathi",
            Self::Gujarati => "Gujarati",
        }
    }

    /// Native writing system
    pub fn script(&self) -> Script {
        match self {
            Self::English => Script::Latin,
            Self::Hindi | Self::Marathi => Script::Devanagari,
            Self::Tamil => Script::Tamil,
            Self::Telugu => Script::Telugu,
            Self::Bengali => Script::Bengali,
            Self::Kannada => Script::Kannada,
            Self::Malayalam => Script::Malayalam,
            Self::Punjabi => Script::Gurmukhi,
            Self::Gujarati => Script::Gujarati,
        }
    }

    pub fn is_pivot(&self) -> bool {
        *self == PIVOT_LANGUAGE
    }

    /// Parse a locale tag.
    ///
    /// Accepts the full tag ("kn-IN", case-insensitive, `_` or `-`) and the bare
    /// ISO 639-1 code ("kn"). Anything else is unsupported.
    pub fn from_locale(code: &str) -> Option<Self> {
        let normalized = code.trim().replace('_', "-").to_ascii_lowercase();
        let primary = match normalized.split_once('-') {
            Some((lang, region)) if region == "in" => lang,
            Some(_) => return None,
            None => normalized.as_str(),
        };
        match primary {
            "en" => Some(Self::English),
            "hi" => Some(Self::Hindi),
            "ta" => Some(Self::Tamil),
            "te" => Some(Self::Telugu),
            "bn" => Some(Self::Bengali),
            "kn" => Some(Self::Kannada),
            "ml" => Some(Self::Malayalam),
            "pa" => Some(Self::Punjabi),
            "mr" => Some(Self::Marathi),
            "gu" => Some(Self::Gujarati),
            _ => None,
        }
    }

    /// All supported languages
    pub fn all() -> &'static [LanguageCode] {
        &[
            Self::English,
            Self::Hindi,
            Self::Tamil,
            Self::Telugu,
            Self::Bengali,
            Self::Kannada,
            Self::Malayalam,
            Self::Punjabi,
            Self::Marathi,
            Self::Gujarati,
        ]
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_locale())
    }
}

impl FromStr for LanguageCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_locale(s).ok_or_else(|| Error::UnsupportedLanguage(s.to_string()))
    }
}

/// Script systems used by the supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Script {
    Latin,
    Devanagari,
    Bengali,
    Gurmukhi,
    Gujarati,
    Tamil,
    Telugu,
    Kannada,
    Malayalam,
}

impl Script {
    const ALL: [Script; 9] = [
        Script::Devanagari,
        Script::Bengali,
        Script::Gurmukhi,
        Script::Gujarati,
        Script::Tamil,
        Script::Telugu,
        Script::Kannada,
        Script::Malayalam,
        Script::Latin,
    ];

    /// Unicode block for this script
    pub fn unicode_range(&self) -> (u32, u32) {
        match self {
            Self::Latin => (0x0041, 0x024F),
            Self::Devanagari => (0x0900, 0x097F),
            Self::Bengali => (0x0980, 0x09FF),
            Self::Gurmukhi => (0x0A00, 0x0A7F),
            Self::Gujarati => (0x0A80, 0x0AFF),
            Self::Tamil => (0x0B80, 0x0BFF),
            Self::Telugu => (0x0C00, 0x0C7F),
            Self::Kannada => (0x0C80, 0x0CFF),
            Self::Malayalam => (0x0D00, 0x0D7F),
        }
    }

    /// Check if a character belongs to this script
    pub fn contains_char(&self, c: char) -> bool {
        let code = c as u32;
        let (start, end) = self.unicode_range();
        match self {
            // Digits, punctuation and symbols in the Latin block are shared by all scripts
            Self::Latin => c.is_alphabetic() && code >= start && code <= end,
            _ => code >= start && code <= end,
        }
    }

    /// Detect the dominant script of `text` (most frequent letter script)
    pub fn detect(text: &str) -> Option<Self> {
        let mut counts = [0usize; 9];

        for c in text.chars() {
            if let Some(idx) = Self::ALL.iter().position(|s| s.contains_char(c)) {
                counts[idx] += 1;
            }
        }

        counts
            .iter()
            .enumerate()
            .filter(|(_, n)| **n > 0)
            .max_by_key(|(_, n)| **n)
            .map(|(idx, _)| Self::ALL[idx])
    }

    /// Default language for text written in this script.
    ///
    /// Devanagari maps to Hindi; Marathi text cannot be told apart by script alone.
    pub fn default_language(&self) -> LanguageCode {
        match self {
            Self::Latin => LanguageCode::English,
            Self::Devanagari => LanguageCode::Hindi,
            Self::Bengali => LanguageCode::Bengali,
            Self::Gurmukhi => LanguageCode::Punjabi,
            Self::Gujarati => LanguageCode::Gujarati,
            Self::Tamil => LanguageCode::Tamil,
            Self::Telugu => LanguageCode::Telugu,
            Self::Kannada => LanguageCode::Kannada,
            Self::Malayalam => LanguageCode::Malayalam,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_round_trip() {
        for lang in LanguageCode::all() {
            assert_eq!(LanguageCode::from_locale(lang.as_locale()), Some(*lang));
        }
        assert_eq!(LanguageCode::all().len(), 10);
    }

    #[test]
    fn test_from_locale_variants() {
        assert_eq!(LanguageCode::from_locale("kn"), Some(LanguageCode::Kannada));
        assert_eq!(LanguageCode::from_locale("KN-in"), Some(LanguageCode::Kannada));
        assert_eq!(LanguageCode::from_locale("pa_IN"), Some(LanguageCode::Punjabi));
        assert_eq!(LanguageCode::from_locale("or-IN"), None);
        assert_eq!(LanguageCode::from_locale("en-US"), None);
        assert_eq!(LanguageCode::from_locale(""), None);
    }

    #[test]
    fn test_from_str_unsupported() {
        let err = "ur-IN".parse::<LanguageCode>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedLanguage(code) if code == "ur-IN"));
    }

    #[test]
    fn test_serde_uses_locale_tags() {
        let json = serde_json::to_string(&LanguageCode::Kannada).unwrap();
        assert_eq!(json, "\"kn-IN\"");
        let parsed: LanguageCode = serde_json::from_str("\"ta-IN\"").unwrap();
        assert_eq!(parsed, LanguageCode::Tamil);
    }

    #[test]
    fn test_script_detect() {
        assert_eq!(Script::detect("Hello world 123"), Some(Script::Latin));
        assert_eq!(Script::detect("ನನಗೆ 32 ವರ್ಷ"), Some(Script::Kannada));
        assert_eq!(Script::detect("வணக்கம்"), Some(Script::Tamil));
        assert_eq!(Script::detect("नमस्ते"), Some(Script::Devanagari));
        assert_eq!(Script::detect("12,000 ..."), None);
    }

    #[test]
    fn test_language_script() {
        assert_eq!(LanguageCode::Marathi.script(), Script::Devanagari);
        assert_eq!(LanguageCode::Punjabi.script(), Script::Gurmukhi);
        assert_eq!(Script::Kannada.default_language(), LanguageCode::Kannada);
        assert!(LanguageCode::English.is_pivot());
    }
}
