//! Configuration loaded from essaygen.toml and environment variables
//!
//! Env overrides win over the file (env-first). The API credential is
//! environment-only: it is never read from the config file and never logged.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub api: ApiConfig,
    pub generation: GenerationConfig,
    pub output: OutputConfig,
    /// API credential, environment-only
    #[serde(skip)]
    pub api_key: Option<String>,
    /// Refuse the offline fallback when no key is configured
    #[serde(skip)]
    pub strict: bool,
}

/// Completion endpoint settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// "auto", "openai", or "fake"
    pub provider: String,
    pub base_url: String,
    pub model: String,
}

/// Sampling, retry, and pacing settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_tokens: u32,
    pub attempts: u32,
    pub retry_delay_ms: u64,
    pub pacing_delay_ms: u64,
}

/// Rendered document settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                provider: "auto".to_string(),
                base_url: "https://api.siliconflow.cn/v1".to_string(),
                model: "deepseek-ai/DeepSeek-V3".to_string(),
            },
            generation: GenerationConfig {
                temperature: 0.8,
                max_tokens: 2000,
                attempts: 3,
                retry_delay_ms: 2000,
                pacing_delay_ms: 1000,
            },
            output: OutputConfig {
                path: PathBuf::from("中考范文库.md"),
            },
            api_key: None,
            strict: false,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    /// Uses the ESSAY_CONFIG environment variable or "essaygen.toml".
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, optionally from an explicit file path
    pub fn load_from(path: Option<&Path>) -> anyhow::Result<Self> {
        // .env loading: ESSAY_ENV_FILE if set, else ./.env; missing files are fine
        if let Ok(env_path) = std::env::var("ESSAY_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::from_path(".env");
        }

        let config_path: PathBuf = match path {
            Some(p) => p.to_path_buf(),
            None => std::env::var("ESSAY_CONFIG")
                .unwrap_or_else(|_| "essaygen.toml".to_string())
                .into(),
        };

        let mut config: Config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            toml::from_str(&content)?
        } else {
            tracing::debug!(
                "Config file {} not found, using defaults",
                config_path.display()
            );
            Self::default()
        };

        config.apply_env_overrides();
        config.validate();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("ESSAY_PROVIDER") {
            self.api.provider = v;
        }
        if let Ok(v) = std::env::var("ESSAY_BASE_URL") {
            self.api.base_url = v;
        }
        if let Ok(v) = std::env::var("ESSAY_MODEL") {
            self.api.model = v;
        }
        if let Some(v) = env_parse::<f32>("ESSAY_TEMPERATURE") {
            self.generation.temperature = v;
        }
        if let Some(v) = env_parse::<u32>("ESSAY_MAX_TOKENS") {
            self.generation.max_tokens = v;
        }
        if let Some(v) = env_parse::<u32>("ESSAY_RETRIES") {
            self.generation.attempts = v;
        }
        if let Some(v) = env_parse::<u64>("ESSAY_RETRY_DELAY_MS") {
            self.generation.retry_delay_ms = v;
        }
        if let Some(v) = env_parse::<u64>("ESSAY_PACING_MS") {
            self.generation.pacing_delay_ms = v;
        }
        if let Ok(v) = std::env::var("ESSAY_OUTPUT") {
            self.output.path = PathBuf::from(v);
        }

        // Credential comes from the environment only
        self.api_key = ["ESSAY_API_KEY", "SILICONFLOW_API_KEY", "OPENAI_API_KEY"]
            .iter()
            .find_map(|key| std::env::var(key).ok())
            .filter(|v| !v.trim().is_empty());

        self.strict = std::env::var("ESSAY_STRICT")
            .is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
    }

    /// Clamp out-of-range values, warn on suspicious ones
    pub fn validate(&mut self) {
        if self.generation.attempts == 0 {
            self.generation.attempts = 1;
        } else if self.generation.attempts > 10 {
            tracing::warn!(
                "attempts {} exceeds max 10, clamping to 10",
                self.generation.attempts
            );
            self.generation.attempts = 10;
        }

        if !(0.0..=2.0).contains(&self.generation.temperature) {
            tracing::warn!(
                "temperature {} out of range, clamping to 0.0..=2.0",
                self.generation.temperature
            );
            self.generation.temperature = self.generation.temperature.clamp(0.0, 2.0);
        }

        if self.generation.max_tokens == 0 {
            self.generation.max_tokens = 1;
        }

        if !self.api.base_url.starts_with("http://")
            && !self.api.base_url.starts_with("https://")
        {
            tracing::warn!(
                "Base URL '{}' doesn't start with http:// or https://",
                self.api.base_url
            );
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
