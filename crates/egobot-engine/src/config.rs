use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{EgobotError, Result};

pub const DEFAULT_MODEL: &str = "nvidia/cosmos-reason2-8b";
pub const DEFAULT_BASE_URL: &str = "https://integrate.api.nvidia.com/v1";
const API_KEY_URL: &str = "https://build.nvidia.com/settings/api-keys";

#[derive(Clone, PartialEq)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub video_fps: f64,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: 4096,
            temperature: 0.3,
            top_p: 0.3,
            video_fps: 2.0,
            request_timeout_secs: 120,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("Config")
            .field("api_key", &api_key)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("video_fps", &self.video_fps)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(non_empty_env)
    }

    /// Builds a config from any key lookup. Unset or blank keys keep their
    /// defaults; unparsable numbers are a configuration error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };
        Ok(Self {
            api_key: value("NVIDIA_API_KEY").unwrap_or(defaults.api_key),
            model: value("COSMOS_MODEL").unwrap_or(defaults.model),
            base_url: normalize_base_url(
                &value("COSMOS_BASE_URL").unwrap_or(defaults.base_url),
            ),
            max_tokens: parse_or("MAX_TOKENS", value("MAX_TOKENS"), defaults.max_tokens)?,
            temperature: parse_or("TEMPERATURE", value("TEMPERATURE"), defaults.temperature)?,
            top_p: parse_or("TOP_P", value("TOP_P"), defaults.top_p)?,
            video_fps: parse_or("VIDEO_FPS", value("VIDEO_FPS"), defaults.video_fps)?,
            request_timeout_secs: parse_or(
                "REQUEST_TIMEOUT_SECS",
                value("REQUEST_TIMEOUT_SECS"),
                defaults.request_timeout_secs,
            )?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(EgobotError::config(format!(
                "NVIDIA_API_KEY is required. Get one at {API_KEY_URL}"
            )));
        }
        if self.max_tokens == 0 {
            return Err(EgobotError::config("MAX_TOKENS must be positive"));
        }
        if self.video_fps.is_nan() || self.video_fps <= 0.0 {
            return Err(EgobotError::config("VIDEO_FPS must be positive"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = normalize_base_url(base_url.as_ref());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn with_video_fps(mut self, video_fps: f64) -> Self {
        self.video_fps = video_fps;
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| EgobotError::config(format!("{key} has an invalid value: {raw:?}"))),
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
