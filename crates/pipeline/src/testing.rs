//! Deterministic in-process language authority
//!
//! Behaves enough like the real vendor to drive the dialogue end to end
//! without a network:
//!
//! - detection uses scripted answers, then text this authority produced
//!   itself, then the dominant Unicode script
//! - translation uses scripted pairs; unscripted English output is tagged
//!   with the target locale
//! - transliteration maps Latin letters onto letters of the target script
//! - synthesis returns a short silent WAV sized to the text
//!
//! Individual operations can be made to fail or to stall past a timeout.

use std::collections::{HashMap, HashSet, VecDeque};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use loan_assist_core::{
    AudioClip, Error, LanguageAuthority, LanguageCode, RawTranscript, Result, Script,
};

use crate::language_service::LanguageOperation;

#[derive(Default)]
struct Scripted {
    detections: HashMap<String, String>,
    translations: HashMap<(String, LanguageCode, LanguageCode), String>,
    transcripts: VecDeque<RawTranscript>,
    produced: HashMap<String, LanguageCode>,
    failures: HashSet<LanguageOperation>,
    delays: HashMap<LanguageOperation, Duration>,
}

#[derive(Default)]
pub struct ScriptedAuthority {
    scripted: Mutex<Scripted>,
    calls: Arc<Mutex<Vec<LanguageOperation>>>,
}

impl ScriptedAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `detect_language(text)` with `tag`
    pub fn script_detection(&self, text: &str, tag: &str) {
        self.scripted
            .lock()
            .detections
            .insert(text.trim().to_string(), tag.to_string());
    }

    /// Answer `translate(text, source, target)` with `output`
    pub fn script_translation(
        &self,
        text: &str,
        source: LanguageCode,
        target: LanguageCode,
        output: &str,
    ) {
        self.scripted
            .lock()
            .translations
            .insert((text.trim().to_string(), source, target), output.to_string());
    }

    /// Queue a transcript for the next `speech_to_text` call
    pub fn script_transcript(&self, text: &str, language_code: Option<&str>) {
        self.scripted.lock().transcripts.push_back(RawTranscript {
            text: text.to_string(),
            language_code: language_code.map(str::to_string),
        });
    }

    /// Make every call of `operation` fail
    pub fn fail(&self, operation: LanguageOperation) {
        self.scripted.lock().failures.insert(operation);
    }

    pub fn clear_failures(&self) {
        self.scripted.lock().failures.clear();
    }

    /// Stall every call of `operation` before answering
    pub fn delay(&self, operation: LanguageOperation, delay: Duration) {
        self.scripted.lock().delays.insert(operation, delay);
    }

    /// Shared log of operations in call order
    pub fn call_log(&self) -> Arc<Mutex<Vec<LanguageOperation>>> {
        Arc::clone(&self.calls)
    }

    async fn enter(&self, operation: LanguageOperation) -> Result<()> {
        self.calls.lock().push(operation);
        let (delay, failing) = {
            let scripted = self.scripted.lock();
            (
                scripted.delays.get(&operation).copied(),
                scripted.failures.contains(&operation),
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if failing {
            return Err(operation.failure("scripted failure"));
        }
        Ok(())
    }

    fn record(&self, text: &str, language: LanguageCode) {
        self.scripted
            .lock()
            .produced
            .insert(text.trim().to_string(), language);
    }
}

/// Letters of a script's consonant block, skipping unassigned code points
fn alphabet(script: Script) -> Vec<char> {
    let (start, _) = script.unicode_range();
    (start + 0x15..=start + 0x39)
        .filter_map(char::from_u32)
        .filter(|c| c.is_alphabetic())
        .collect()
}

fn to_script(text: &str, script: Script) -> String {
    let letters = alphabet(script);
    if letters.is_empty() {
        return text.to_string();
    }
    text.chars()
        .map(|c| {
            if c.is_ascii_alphabetic() {
                let index = (c.to_ascii_lowercase() as u8 - b'a') as usize;
                letters[index % letters.len()]
            } else {
                c
            }
        })
        .collect()
}

fn silent_wav(frames: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: loan_assist_config::constants::tts::SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let synthesis_error = |e: hound::Error| Error::SpeechSynthesis(e.to_string());

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec).map_err(synthesis_error)?;
    for _ in 0..frames {
        writer.write_sample(0i16).map_err(synthesis_error)?;
    }
    writer.finalize().map_err(synthesis_error)?;
    Ok(cursor.into_inner())
}

#[async_trait]
impl LanguageAuthority for ScriptedAuthority {
    async fn detect_language(&self, text: &str) -> Result<String> {
        self.enter(LanguageOperation::Detect).await?;
        let key = text.trim();
        let scripted = self.scripted.lock();

        if let Some(tag) = scripted.detections.get(key) {
            return Ok(tag.clone());
        }
        if let Some(language) = scripted.produced.get(key) {
            return Ok(language.as_locale().to_string());
        }
        let language = Script::detect(key)
            .map(|s| s.default_language())
            .unwrap_or(LanguageCode::English);
        Ok(language.as_locale().to_string())
    }

    async fn translate(
        &self,
        text: &str,
        source: LanguageCode,
        target: LanguageCode,
    ) -> Result<String> {
        self.enter(LanguageOperation::Translate).await?;

        let key = (text.trim().to_string(), source, target);
        if let Some(output) = self.scripted.lock().translations.get(&key) {
            return Ok(output.clone());
        }

        if target.is_pivot() {
            return Ok(text.trim().to_string());
        }
        Ok(format!("{} [{}]", text.trim(), target.as_locale()))
    }

    async fn transliterate(&self, text: &str, target: LanguageCode) -> Result<String> {
        self.enter(LanguageOperation::Transliterate).await?;
        if target.is_pivot() {
            return Ok(text.to_string());
        }

        let rendered = to_script(text, target.script());
        self.record(&rendered, target);
        Ok(rendered)
    }

    async fn speech_to_text(&self, audio: &AudioClip) -> Result<RawTranscript> {
        self.enter(LanguageOperation::SpeechToText).await?;
        tracing::trace!(bytes = audio.bytes.len(), "Scripted transcription");

        self.scripted
            .lock()
            .transcripts
            .pop_front()
            .ok_or_else(|| Error::SpeechRecognition("no scripted transcript".to_string()))
    }

    async fn text_to_speech(&self, text: &str, _language: LanguageCode) -> Result<Vec<u8>> {
        self.enter(LanguageOperation::TextToSpeech).await?;
        silent_wav(text.chars().count() as u32 * 10)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
