//! Configuration management for the loan advisor
//!
//! Supports loading configuration from:
//! - YAML files (`config/default.yaml`, `config/{env}.yaml`)
//! - Environment variables (LOAN_ASSIST_ prefix, `__` separator)
//!
//! Also holds the immutable product tables the dialogue reads from:
//! - `catalog` - loan products, eligibility rules, related terms, application steps
//! - `tips` - financial literacy tip corpora

pub mod catalog;
pub mod constants;
pub mod settings;
pub mod tips;

pub use catalog::{
    application_steps, product, products, rule, AgeBounds, ApplicationStep, EligibilityRule,
    LoanProduct,
};
pub use settings::{
    load_settings, AudioConfig, LanguageServiceConfig, LlmProvider, LlmSettings,
    ObservabilityConfig, PersistenceConfig, RuntimeEnvironment, ServerConfig, Settings,
};
pub use tips::TipCategory;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment error: {0}")]
    Environment(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => ConfigError::MissingField(key),
            other => ConfigError::ParseError(other.to_string()),
        }
    }
}

impl From<ConfigError> for loan_assist_core::Error {
    fn from(err: ConfigError) -> Self {
        loan_assist_core::Error::Configuration(err.to_string())
    }
}
