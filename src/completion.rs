//! Chat-completion providers
//!
//! One trait, two implementations: an OpenAI-compatible HTTP client and a
//! deterministic offline provider for tests and dry runs. Provider selection
//! happens in [`create_provider`] based on config and environment.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
    fn model(&self) -> &str;
}

// OpenAI-compatible chat completions implementation
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    attempts: u32,
    retry_delay: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, base_url: String, model: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to build reqwest client with timeout")?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            temperature: 0.8,
            max_tokens: 2000,
            attempts: 3,
            retry_delay: Duration::from_millis(2000),
        })
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_retry(mut self, attempts: u32, retry_delay: Duration) -> Self {
        self.attempts = attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(
            "Requesting completion (model={}, prompt_chars={})",
            self.model,
            prompt.chars().count()
        );

        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        };

        // Fixed-count retry with a fixed pause between attempts
        let mut last_err: Option<anyhow::Error> = None;
        for attempt in 0..self.attempts {
            if attempt > 0 {
                tokio::time::sleep(self.retry_delay).await;
            }

            let send_res = self
                .client
                .post(self.endpoint())
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
                .context("Failed to send request to completion API");
            let response = match send_res {
                Ok(resp) => resp,
                Err(e) => {
                    warn!("Completion attempt {} failed: {:#}", attempt + 1, e);
                    last_err = Some(e);
                    continue;
                }
            };

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_default();
                warn!(
                    "Completion attempt {} failed: API error {}",
                    attempt + 1,
                    status
                );
                last_err = Some(anyhow::anyhow!(
                    "Completion API error {}: {}",
                    status,
                    error_text
                ));
                continue;
            }

            let parse_res: Result<ChatResponse> = response
                .json()
                .await
                .context("Failed to parse completion response");
            match parse_res {
                Ok(result) => {
                    return result
                        .choices
                        .into_iter()
                        .next()
                        .map(|c| c.message.content)
                        .context("No choices returned from completion API");
                }
                Err(e) => {
                    warn!("Completion attempt {} failed: {:#}", attempt + 1, e);
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Unknown completion API error")))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Deterministic, local FakeProvider for testing/dev (no network)
pub struct FakeProvider {
    model: String,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            model: "fake-completion".to_string(),
        }
    }

    // Stable placeholder essay derived from the prompt
    fn generate(&self, prompt: &str) -> String {
        use sha2::{Digest, Sha256};
        let digest = Sha256::digest(prompt.as_bytes());
        let tag: String = digest.iter().take(4).map(|b| format!("{:02x}", b)).collect();
        let subject = prompt
            .lines()
            .find(|line| line.starts_with("主题："))
            .unwrap_or("主题：未知");
        format!(
            "（离线样文 {tag}）\n{subject}\n这是一篇离线生成的占位范文，用于在没有网络的情况下验证生成流程与文档渲染。"
        )
    }
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionProvider for FakeProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        Ok(self.generate(prompt))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Factory function to create a provider based on config and environment.
///
/// Selection order: respect an explicit provider name, else use the HTTP
/// provider when a key is configured, else fall back to the offline provider
/// unless strict mode forbids it.
pub fn create_provider(config: &Config) -> Result<Arc<dyn CompletionProvider>> {
    let is_placeholder = |s: &str| {
        let t = s.trim();
        t.is_empty()
            || t.contains("${")
            || t.eq_ignore_ascii_case("your-api-key-here")
            || t.eq_ignore_ascii_case("changeme")
    };

    let http_provider = |key: String| -> Result<Arc<dyn CompletionProvider>> {
        info!(
            "Using OpenAI-compatible completions (model={}, base_url={})",
            config.api.model, config.api.base_url
        );
        Ok(Arc::new(
            OpenAiProvider::new(key, config.api.base_url.clone(), config.api.model.clone())?
                .with_sampling(config.generation.temperature, config.generation.max_tokens)
                .with_retry(
                    config.generation.attempts,
                    Duration::from_millis(config.generation.retry_delay_ms),
                ),
        ))
    };

    match config.api.provider.as_str() {
        "openai" => {
            let key = config.api_key.clone().unwrap_or_default();
            if is_placeholder(&key) {
                anyhow::bail!("provider=openai but no API key is set; export ESSAY_API_KEY");
            }
            http_provider(key)
        }
        "fake" => {
            info!("Using FakeProvider (deterministic, offline)");
            Ok(Arc::new(FakeProvider::new()))
        }
        "" | "auto" => {
            if let Some(key) = config.api_key.as_deref().filter(|k| !is_placeholder(k)) {
                return http_provider(key.to_string());
            }
            if config.strict {
                anyhow::bail!(
                    "No completion provider configured; set ESSAY_API_KEY or ESSAY_PROVIDER=fake"
                );
            }
            info!("No API key found, using FakeProvider (deterministic, offline)");
            Ok(Arc::new(FakeProvider::new()))
        }
        other => anyhow::bail!("Unknown completion provider '{}'", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fake_provider_is_deterministic() {
        let provider = FakeProvider::new();
        let a = provider.complete("主题：坚持\n写一篇记叙文").await.unwrap();
        let b = provider.complete("主题：坚持\n写一篇记叙文").await.unwrap();
        assert_eq!(a, b);
        assert!(a.contains("主题：坚持"));
    }

    #[tokio::test]
    async fn fake_provider_varies_with_prompt() {
        let provider = FakeProvider::new();
        let a = provider.complete("主题：坚持").await.unwrap();
        let b = provider.complete("主题：亲情").await.unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn fake_is_selected_when_forced() {
        let mut config = Config::default();
        config.api.provider = "fake".to_string();
        config.api_key = Some("real-looking-key".to_string());
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.model(), "fake-completion");
    }

    #[test]
    fn auto_without_key_falls_back_to_fake() {
        let mut config = Config::default();
        config.api.provider = "auto".to_string();
        config.api_key = None;
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.model(), "fake-completion");
    }

    #[test]
    fn strict_mode_refuses_fallback() {
        let mut config = Config::default();
        config.api.provider = "auto".to_string();
        config.api_key = None;
        config.strict = true;
        assert!(create_provider(&config).is_err());
    }

    #[test]
    fn placeholder_key_is_rejected_for_openai() {
        let mut config = Config::default();
        config.api.provider = "openai".to_string();
        config.api_key = Some("your-api-key-here".to_string());
        assert!(create_provider(&config).is_err());
    }
}
