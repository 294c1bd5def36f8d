//! Data models and structures
//!
//! Defines the text-to-image API payloads and the runtime configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://engine.prod.bria-api.com";
pub const DEFAULT_MODEL_VERSION: &str = "2.3";
pub const DEFAULT_PROMPT: &str = "a baby riding a bicycle in a field of flowers";

// Text-to-image API Request/Response models
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TextToImageRequest {
    pub prompt: String,
    pub num_results: u32,
    pub sync: bool,
}

impl TextToImageRequest {
    /// A request for one image, with the server blocking until it is ready.
    pub fn single(prompt: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            num_results: 1,
            sync: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TextToImageResponse {
    #[serde(default)]
    pub result: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedImage {
    #[serde(default)]
    pub urls: Vec<String>,
    pub seed: Option<i64>,
    pub uuid: Option<String>,
}

impl TextToImageResponse {
    /// `result[0].urls[0]`, when present and non-empty.
    pub fn first_image_url(&self) -> Option<&str> {
        self.result
            .first()
            .and_then(|image| image.urls.first())
            .map(String::as_str)
            .filter(|url| !url.is_empty())
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_token: String,
    pub model_version: String,
    pub base_url: String,
    pub default_prompt: String,
    pub request_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        Self::from_env_with_token(None)
    }

    /// Like [`Config::from_env`], with `api_token` taking precedence over
    /// `BRIA_API_TOKEN`.
    pub fn from_env_with_token(api_token: Option<String>) -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let api_token = match api_token {
            Some(token) => token,
            None => std::env::var("BRIA_API_TOKEN")
                .map_err(|_| crate::Error::Config("BRIA_API_TOKEN not set".to_string()))?,
        };

        let request_timeout = match std::env::var("REQUEST_TIMEOUT_SECS") {
            Ok(raw) => Some(parse_timeout_secs(&raw)?),
            Err(_) => None,
        };

        Ok(Self {
            api_token,
            model_version: std::env::var("BRIA_MODEL_VERSION")
                .unwrap_or_else(|_| DEFAULT_MODEL_VERSION.to_string()),
            base_url: std::env::var("BRIA_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            default_prompt: std::env::var("DEFAULT_PROMPT")
                .unwrap_or_else(|_| DEFAULT_PROMPT.to_string()),
            request_timeout,
        })
    }

    /// Config with defaults for everything except the token.
    pub fn with_token(api_token: String) -> Self {
        Self {
            api_token,
            model_version: DEFAULT_MODEL_VERSION.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_prompt: DEFAULT_PROMPT.to_string(),
            request_timeout: None,
        }
    }
}

fn parse_timeout_secs(raw: &str) -> crate::Result<Duration> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .ok_or_else(|| {
            crate::Error::Config(format!(
                "Invalid REQUEST_TIMEOUT_SECS '{}'. Expected a positive number of seconds",
                raw
            ))
        })
}
