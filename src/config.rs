use crate::error::{MemeError, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub const FAN_OUT: usize = 3;
pub const VARIATION_HINTS: [&str; FAN_OUT] = [
    "Make this version witty and clever, with a sharp play on words or a smart observation.",
    "Make this version absurd and unexpected, with a surreal or random twist nobody sees coming.",
    "Make this version relatable and everyday, capturing a feeling everyone has had in ordinary life.",
];
pub const DEFAULT_STORY_PANELS: usize = 4;
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the credential and endpoint settings. A missing API key is an
    /// error here so the binary can refuse to start.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                MemeError::ConfigError(
                    "GEMINI_API_KEY (or API_KEY) environment variable is not set".into(),
                )
            })?;

        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let base_url =
            env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout = env::var("GEMINI_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));

        Ok(GeminiConfig {
            api_key: Some(api_key),
            model,
            base_url,
            timeout,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub fan_out: usize,
    pub variation_hints: Vec<String>,
    pub story_panels: usize,
    pub call_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        OrchestratorConfig {
            fan_out: FAN_OUT,
            variation_hints: VARIATION_HINTS.iter().map(|h| h.to_string()).collect(),
            story_panels: DEFAULT_STORY_PANELS,
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
        }
    }
}

impl OrchestratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(panels) = env::var("MEME_STORY_PANELS") {
            let panels = panels.parse().map_err(|_| {
                MemeError::ConfigError(format!("MEME_STORY_PANELS must be 3 or 4, got {}", panels))
            })?;
            config = config.with_story_panels(panels)?;
        }

        if let Ok(secs) = env::var("MEME_CALL_TIMEOUT_SECS") {
            config.call_timeout = parse_call_timeout(&secs)?;
        }

        Ok(config)
    }

    pub fn with_story_panels(mut self, panels: usize) -> Result<Self> {
        if !(3..=4).contains(&panels) {
            return Err(MemeError::ConfigError(format!(
                "story panel count must be 3 or 4, got {}",
                panels
            )));
        }
        self.story_panels = panels;
        Ok(self)
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}

/// Whole seconds, at least one.
fn parse_call_timeout(value: &str) -> Result<Duration> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(MemeError::ConfigError(format!(
            "MEME_CALL_TIMEOUT_SECS must be a positive number of seconds, got {}",
            value
        ))),
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub orchestrator: OrchestratorConfig,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Result<Self> {
        Ok(Config {
            gemini: GeminiConfig::from_env()?,
            orchestrator: OrchestratorConfig::from_env()?,
        })
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self
    }

    pub fn with_orchestrator(mut self, config: OrchestratorConfig) -> Self {
        self.orchestrator = config;
        self
    }
}
