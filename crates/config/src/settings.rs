//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{audio, endpoints, models, sessions, timeouts, tts};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Relaxed validation, warnings only
    #[default]
    Development,
    Staging,
    /// All validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub server: ServerConfig,

    /// Translation / transliteration / speech authority
    #[serde(default)]
    pub language_service: LanguageServiceConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    /// Optional LLM used to elaborate tips
    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub persistence: PersistenceConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_language_service()?;
        self.validate_audio()?;
        self.validate_llm()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        let server = &self.server;

        if server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if server.max_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.max_sessions".to_string(),
                message: "Max sessions must be at least 1".to_string(),
            });
        }

        if server.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if self.environment.is_production() && server.cors_enabled && server.cors_origins.is_empty() {
            tracing::warn!(
                "CORS is enabled in production but no origins are configured. \
                 This may block legitimate requests."
            );
        }

        Ok(())
    }

    fn validate_language_service(&self) -> Result<(), ConfigError> {
        let ls = &self.language_service;

        if ls.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "language_service.timeout_ms".to_string(),
                message: "Timeout must be at least 1ms".to_string(),
            });
        }

        if ls.tts_max_chunk_chars < 20 {
            return Err(ConfigError::InvalidValue {
                field: "language_service.tts_max_chunk_chars".to_string(),
                message: format!("Must be at least 20, got {}", ls.tts_max_chunk_chars),
            });
        }

        if !ls.base_url.starts_with("http://") && !ls.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "language_service.base_url".to_string(),
                message: format!("Not an http(s) URL: {}", ls.base_url),
            });
        }

        Ok(())
    }

    fn validate_audio(&self) -> Result<(), ConfigError> {
        let max = self.audio.max_duration_secs;
        if !max.is_finite() || max <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "audio.max_duration_secs".to_string(),
                message: format!("Must be a positive number of seconds, got {}", max),
            });
        }
        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        let llm = &self.llm;
        if !llm.enabled {
            return Ok(());
        }

        if llm.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.timeout_ms".to_string(),
                message: "Timeout must be at least 1ms".to_string(),
            });
        }

        if !(0.0..=2.0).contains(&llm.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "llm.temperature".to_string(),
                message: format!("Must be between 0.0 and 2.0, got {}", llm.temperature),
            });
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Idle time before a session is discarded
    #[serde(default = "default_session_timeout")]
    pub session_timeout_secs: u64,

    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_timeout() -> u64 {
    // Covers detect + translate + localize + synthesis at the per-call ceiling
    150
}
fn default_true() -> bool {
    true
}
fn default_max_sessions() -> usize {
    sessions::MAX_SESSIONS
}
fn default_session_timeout() -> u64 {
    sessions::IDLE_TIMEOUT_SECS
}
fn default_cleanup_interval() -> u64 {
    sessions::CLEANUP_INTERVAL_SECS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_timeout(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            max_sessions: default_max_sessions(),
            session_timeout_secs: default_session_timeout(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

/// Language authority configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageServiceConfig {
    #[serde(default = "default_sarvam_url")]
    pub base_url: String,

    /// Subscription key. Falls back to `SARVAM_API_KEY`.
    #[serde(default = "default_sarvam_key")]
    pub api_key: Option<String>,

    /// Per-call timeout
    #[serde(default = "default_language_timeout")]
    pub timeout_ms: u64,

    #[serde(default = "default_translate_model")]
    pub translate_model: String,

    /// Script requested from the translator; transliteration converts it to native
    #[serde(default = "default_output_script")]
    pub translate_output_script: String,

    #[serde(default = "default_stt_model")]
    pub stt_model: String,

    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    #[serde(default = "default_tts_chunk")]
    pub tts_max_chunk_chars: usize,

    #[serde(default = "default_tts_sample_rate")]
    pub tts_sample_rate: u32,
}

fn default_sarvam_url() -> String {
    endpoints::SARVAM_DEFAULT.to_string()
}
fn default_sarvam_key() -> Option<String> {
    std::env::var("SARVAM_API_KEY").ok().filter(|k| !k.trim().is_empty())
}
fn default_language_timeout() -> u64 {
    timeouts::LANGUAGE_SERVICE_MS
}
fn default_translate_model() -> String {
    models::TRANSLATE.to_string()
}
fn default_output_script() -> String {
    "roman".to_string()
}
fn default_stt_model() -> String {
    models::SPEECH_TO_TEXT.to_string()
}
fn default_tts_model() -> String {
    models::TEXT_TO_SPEECH.to_string()
}
fn default_tts_chunk() -> usize {
    tts::MAX_CHUNK_CHARS
}
fn default_tts_sample_rate() -> u32 {
    tts::SAMPLE_RATE
}

impl Default for LanguageServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_sarvam_url(),
            api_key: default_sarvam_key(),
            timeout_ms: default_language_timeout(),
            translate_model: default_translate_model(),
            translate_output_script: default_output_script(),
            stt_model: default_stt_model(),
            tts_model: default_tts_model(),
            tts_max_chunk_chars: default_tts_chunk(),
            tts_sample_rate: default_tts_sample_rate(),
        }
    }
}

impl LanguageServiceConfig {
    /// The subscription key, or a configuration error when absent
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::MissingField("language_service.api_key".to_string()))
    }
}

/// Audio admission configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_max_audio")]
    pub max_duration_secs: f64,
}

fn default_max_audio() -> f64 {
    audio::MAX_DURATION_SECS
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            max_duration_secs: default_max_audio(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Any OpenAI-compatible chat completions API
    #[default]
    OpenAi,
    Ollama,
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Disabled by default; tips fall back to static text
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub provider: LlmProvider,

    /// Base URL; provider default when unset
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_llm_timeout")]
    pub timeout_ms: u64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_llm_timeout() -> u64 {
    timeouts::LLM_MS
}
fn default_max_tokens() -> usize {
    200
}
fn default_temperature() -> f32 {
    0.5
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: LlmProvider::default(),
            endpoint: None,
            model: default_llm_model(),
            api_key: None,
            timeout_ms: default_llm_timeout(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl LlmSettings {
    pub fn endpoint_or_default(&self) -> &str {
        match (&self.endpoint, self.provider) {
            (Some(endpoint), _) => endpoint,
            (None, LlmProvider::OpenAi) => endpoints::OPENAI_DEFAULT,
            (None, LlmProvider::Ollama) => endpoints::OLLAMA_DEFAULT,
        }
    }
}

/// Session store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// false = in-memory only
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// JSON file holding all sessions
    #[serde(default = "default_store_path")]
    pub path: String,
}

fn default_store_path() -> String {
    "data/sessions.json".to_string()
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_store_path(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Expose Prometheus metrics at /metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (LOAN_ASSIST_ prefix, `__` separator)
/// 2. config/{env}.yaml (if env specified)
/// 3. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("LOAN_ASSIST")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.audio.max_duration_secs, 30.0);
        assert_eq!(settings.language_service.tts_max_chunk_chars, 450);
        assert_eq!(settings.language_service.translate_output_script, "roman");
        assert!(!settings.llm.enabled);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());

        settings.server.port = 9000;
        settings.audio.max_duration_secs = 0.0;
        assert!(settings.validate().is_err());

        settings.audio.max_duration_secs = 30.0;
        settings.language_service.timeout_ms = 0;
        assert!(settings.validate().is_err());

        settings.language_service.timeout_ms = 1000;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_llm_validated_only_when_enabled() {
        let mut settings = Settings::default();
        settings.llm.temperature = 5.0;
        assert!(settings.validate().is_ok());

        settings.llm.enabled = true;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let mut ls = LanguageServiceConfig::default();
        ls.api_key = None;
        assert!(matches!(
            ls.require_api_key(),
            Err(ConfigError::MissingField(field)) if field == "language_service.api_key"
        ));

        ls.api_key = Some("   ".to_string());
        assert!(ls.require_api_key().is_err());

        ls.api_key = Some("sk_test".to_string());
        assert_eq!(ls.require_api_key().unwrap(), "sk_test");
    }

    #[test]
    fn test_llm_endpoint_defaults() {
        let mut llm = LlmSettings::default();
        assert_eq!(llm.endpoint_or_default(), endpoints::OPENAI_DEFAULT);
        llm.provider = LlmProvider::Ollama;
        assert_eq!(llm.endpoint_or_default(), endpoints::OLLAMA_DEFAULT);
        llm.endpoint = Some("http://llm.internal:8000/v1".to_string());
        assert_eq!(llm.endpoint_or_default(), "http://llm.internal:8000/v1");
    }

    #[test]
    fn test_deserialize_partial_yaml_like_json() {
        let settings: Settings = serde_json::from_value(serde_json::json!({
            "server": { "port": 9090 },
            "audio": { "max_duration_secs": 20.0 },
            "llm": { "enabled": true, "provider": "ollama", "model": "qwen2.5:3b" }
        }))
        .unwrap();
        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.audio.max_duration_secs, 20.0);
        assert_eq!(settings.llm.provider, LlmProvider::Ollama);
        assert!(settings.persistence.enabled);
    }
}
