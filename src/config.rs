//! Environment-driven configuration.
//!
//! Settings load from the process environment, with a `.env` file picked up
//! via `dotenvy` when present. Only the API key is mandatory; everything
//! else has a sensible default.

use std::env;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::workflow::DEFAULT_DOC_DOMAIN;

const ENV_API_KEY: &str = "TERRAMEND_API_KEY";
const ENV_ENDPOINT: &str = "TERRAMEND_ENDPOINT";
const ENV_MODEL: &str = "TERRAMEND_MODEL";
const ENV_TEMPERATURE: &str = "TERRAMEND_TEMPERATURE";
const ENV_WORKDIR: &str = "TERRAMEND_WORKDIR";
const ENV_DOC_DOMAIN: &str = "TERRAMEND_DOC_DOMAIN";

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.1;
const DEFAULT_WORKDIR: &str = "terramend-workspace";

/// Runtime settings for the production workflow.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Chat-completions API base URL.
    pub endpoint: String,
    /// Bearer key for the generator endpoint.
    pub api_key: String,
    /// Model name.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Validator workdir (the validation sink). One per concurrent run.
    pub workdir: PathBuf,
    /// Documentation domain for discovery searches.
    pub doc_domain: String,
}

/// Problems loading settings from the environment.
#[derive(Debug, Error, Diagnostic)]
pub enum SettingsError {
    #[error("required environment variable {key} is not set")]
    #[diagnostic(
        code(terramend::config::missing_key),
        help("Export the variable or add it to a .env file.")
    )]
    MissingKey { key: &'static str },

    #[error("environment variable {key} has an invalid value: {value}")]
    #[diagnostic(code(terramend::config::invalid_value))]
    InvalidValue { key: &'static str, value: String },
}

impl Settings {
    /// Loads settings from the environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();

        let api_key =
            env::var(ENV_API_KEY).map_err(|_| SettingsError::MissingKey { key: ENV_API_KEY })?;
        let endpoint = env::var(ENV_ENDPOINT).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let model = env::var(ENV_MODEL).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let temperature = match env::var(ENV_TEMPERATURE) {
            Ok(raw) => raw.parse().map_err(|_| SettingsError::InvalidValue {
                key: ENV_TEMPERATURE,
                value: raw,
            })?,
            Err(_) => DEFAULT_TEMPERATURE,
        };
        let workdir = env::var(ENV_WORKDIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_WORKDIR));
        let doc_domain =
            env::var(ENV_DOC_DOMAIN).unwrap_or_else(|_| DEFAULT_DOC_DOMAIN.to_string());

        Ok(Self {
            endpoint,
            api_key,
            model,
            temperature,
            workdir,
            doc_domain,
        })
    }
}
