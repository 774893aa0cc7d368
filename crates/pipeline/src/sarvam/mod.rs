//! Sarvam AI language authority
//!
//! One REST call per operation against `https://api.sarvam.ai`, authenticated
//! with the `api-subscription-key` header. Synthesis splits long text into
//! chunks, synthesizes them in order and merges the WAV payloads.

mod chunking;
mod wav;

pub use chunking::chunk_text;
pub use wav::concat_wav;

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::multipart::{Form, Part};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use loan_assist_config::LanguageServiceConfig;
use loan_assist_core::{AudioClip, LanguageAuthority, LanguageCode, RawTranscript, Result};

use crate::language_service::LanguageOperation;
use crate::PipelineError;

const API_KEY_HEADER: &str = "api-subscription-key";

/// Synthesis voice for a language
pub fn voice_for(language: LanguageCode) -> &'static str {
    match language {
        LanguageCode::Hindi => "neel",
        LanguageCode::Tamil => "amol",
        _ => "meera",
    }
}

/// Sarvam client configuration
#[derive(Debug, Clone)]
pub struct SarvamConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
    pub translate_model: String,
    pub output_script: String,
    pub stt_model: String,
    pub tts_model: String,
    pub tts_max_chunk_chars: usize,
    pub tts_sample_rate: u32,
}

impl SarvamConfig {
    /// Build from settings; a missing key is a configuration error
    pub fn from_settings(settings: &LanguageServiceConfig) -> std::result::Result<Self, PipelineError> {
        let api_key = settings.require_api_key()?.to_string();
        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout: Duration::from_millis(settings.timeout_ms),
            translate_model: settings.translate_model.clone(),
            output_script: settings.translate_output_script.clone(),
            stt_model: settings.stt_model.clone(),
            tts_model: settings.tts_model.clone(),
            tts_max_chunk_chars: settings.tts_max_chunk_chars,
            tts_sample_rate: settings.tts_sample_rate,
        })
    }
}

// Request / response payloads

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    language_code: Option<String>,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    input: &'a str,
    source_language_code: &'a str,
    target_language_code: &'a str,
    speaker_gender: &'a str,
    mode: &'a str,
    model: &'a str,
    enable_preprocessing: bool,
    output_script: &'a str,
    numerals_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translated_text: String,
}

#[derive(Debug, Serialize)]
struct TransliterateRequest<'a> {
    input: &'a str,
    source_language_code: &'a str,
    target_language_code: &'a str,
    numerals_format: &'a str,
    spoken_form_numerals_language: &'a str,
    spoken_form: bool,
}

#[derive(Debug, Deserialize)]
struct TransliterateResponse {
    transliterated_text: String,
}

#[derive(Debug, Deserialize)]
struct SpeechToTextResponse {
    transcript: String,
    #[serde(default)]
    language_code: Option<String>,
}

#[derive(Debug, Serialize)]
struct TextToSpeechRequest<'a> {
    inputs: [&'a str; 1],
    target_language_code: &'a str,
    speaker: &'a str,
    pitch: f32,
    pace: f32,
    loudness: f32,
    speech_sample_rate: u32,
    enable_preprocessing: bool,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct TextToSpeechResponse {
    audios: Vec<String>,
}

/// Sarvam AI REST client
pub struct SarvamClient {
    client: reqwest::Client,
    config: SarvamConfig,
}

impl SarvamClient {
    pub fn new(config: SarvamConfig) -> std::result::Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PipelineError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(base_url = %config.base_url, "Sarvam client ready");
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SarvamConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }

    async fn parse<R: DeserializeOwned>(
        response: reqwest::Response,
    ) -> std::result::Result<R, PipelineError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PipelineError::Api {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json::<R>()
            .await
            .map_err(|e| PipelineError::InvalidResponse(e.to_string()))
    }

    async fn post_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> std::result::Result<R, PipelineError> {
        let response = self
            .client
            .post(self.url(path))
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(body)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn detect_raw(&self, text: &str) -> std::result::Result<String, PipelineError> {
        let response: DetectResponse = self
            .post_json("text-lid", &DetectRequest { input: text })
            .await?;
        response
            .language_code
            .filter(|code| !code.is_empty())
            .ok_or_else(|| PipelineError::InvalidResponse("missing language_code".to_string()))
    }

    async fn translate_raw(
        &self,
        text: &str,
        source: LanguageCode,
        target: LanguageCode,
    ) -> std::result::Result<String, PipelineError> {
        let request = TranslateRequest {
            input: text,
            source_language_code: source.as_locale(),
            target_language_code: target.as_locale(),
            speaker_gender: "Female",
            mode: "formal",
            model: &self.config.translate_model,
            enable_preprocessing: false,
            output_script: &self.config.output_script,
            numerals_format: "international",
        };
        let response: TranslateResponse = self.post_json("translate", &request).await?;
        Ok(response.translated_text)
    }

    async fn transliterate_raw(
        &self,
        text: &str,
        target: LanguageCode,
    ) -> std::result::Result<String, PipelineError> {
        let request = TransliterateRequest {
            input: text,
            source_language_code: LanguageCode::English.as_locale(),
            target_language_code: target.as_locale(),
            numerals_format: "international",
            spoken_form_numerals_language: "native",
            spoken_form: false,
        };
        let response: TransliterateResponse = self.post_json("transliterate", &request).await?;
        Ok(response.transliterated_text)
    }

    async fn speech_to_text_raw(
        &self,
        audio: &AudioClip,
    ) -> std::result::Result<SpeechToTextResponse, PipelineError> {
        let file = Part::bytes(audio.bytes.clone())
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| PipelineError::Audio(e.to_string()))?;
        let form = Form::new()
            .part("file", file)
            .text("model", self.config.stt_model.clone())
            .text("language_code", "unknown")
            .text("with_timestamps", "false")
            .text("with_diarization", "false")
            .text("num_speakers", "1");

        let response = self
            .client
            .post(self.url("speech-to-text"))
            .header(API_KEY_HEADER, &self.config.api_key)
            .multipart(form)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn synthesize_chunk(
        &self,
        chunk: &str,
        language: LanguageCode,
    ) -> std::result::Result<Vec<u8>, PipelineError> {
        let request = TextToSpeechRequest {
            inputs: [chunk],
            target_language_code: language.as_locale(),
            speaker: voice_for(language),
            pitch: 0.0,
            pace: 1.0,
            loudness: 1.0,
            speech_sample_rate: self.config.tts_sample_rate,
            enable_preprocessing: true,
            model: &self.config.tts_model,
        };
        let response: TextToSpeechResponse = self.post_json("text-to-speech", &request).await?;
        let encoded = response
            .audios
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::InvalidResponse("no audio returned".to_string()))?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| PipelineError::InvalidResponse(format!("audio is not base64: {}", e)))
    }

    async fn text_to_speech_raw(
        &self,
        text: &str,
        language: LanguageCode,
    ) -> std::result::Result<Vec<u8>, PipelineError> {
        let chunks = chunk_text(text, self.config.tts_max_chunk_chars);
        tracing::debug!(
            language = %language,
            chunks = chunks.len(),
            voice = voice_for(language),
            "Synthesizing speech"
        );

        let mut audio = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            audio.push(self.synthesize_chunk(chunk, language).await?);
        }
        concat_wav(&audio)
    }
}

#[async_trait]
impl LanguageAuthority for SarvamClient {
    async fn detect_language(&self, text: &str) -> Result<String> {
        self.detect_raw(text)
            .await
            .map_err(|e| e.into_core(LanguageOperation::Detect))
    }

    async fn translate(
        &self,
        text: &str,
        source: LanguageCode,
        target: LanguageCode,
    ) -> Result<String> {
        self.translate_raw(text, source, target)
            .await
            .map_err(|e| e.into_core(LanguageOperation::Translate))
    }

    async fn transliterate(&self, text: &str, target: LanguageCode) -> Result<String> {
        self.transliterate_raw(text, target)
            .await
            .map_err(|e| e.into_core(LanguageOperation::Transliterate))
    }

    async fn speech_to_text(&self, audio: &AudioClip) -> Result<RawTranscript> {
        let response = self
            .speech_to_text_raw(audio)
            .await
            .map_err(|e| e.into_core(LanguageOperation::SpeechToText))?;
        Ok(RawTranscript {
            text: response.transcript,
            language_code: response.language_code,
        })
    }

    async fn text_to_speech(&self, text: &str, language: LanguageCode) -> Result<Vec<u8>> {
        self.text_to_speech_raw(text, language)
            .await
            .map_err(|e| e.into_core(LanguageOperation::TextToSpeech))
    }

    fn name(&self) -> &str {
        "sarvam"
    }
}
