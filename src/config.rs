use std::env;

use crate::model::ConfigError;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CHART_WIDTH: u32 = 1280;
pub const DEFAULT_CHART_HEIGHT: u32 = 720;

/// Runtime configuration resolved from the process environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub request_timeout_secs: u64,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl AppConfig {
    /// Reads the configuration, failing when no usable API key is present.
    /// `GEMINI_API_KEY` wins over the legacy `GOOGLE_API_KEY` name.
    pub fn from_env() -> Result<AppConfig, ConfigError> {
        let gemini_api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("GOOGLE_API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;
        let gemini_model =
            env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(AppConfig {
            gemini_api_key,
            gemini_model,
            gemini_api_base: DEFAULT_API_BASE.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            chart_width: DEFAULT_CHART_WIDTH,
            chart_height: DEFAULT_CHART_HEIGHT,
        })
    }
}
