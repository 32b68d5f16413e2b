use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use ragdb_core::config::{api_key_from_env, GenerationSettings};
use ragdb_core::traits::Generator;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Answers through an OpenAI-compatible `/v1/chat/completions` endpoint.
pub struct ChatCompletionsGenerator {
    client: Client,
    url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    api_key: Option<String>,
}

impl ChatCompletionsGenerator {
    pub fn from_settings(settings: &GenerationSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            url: format!("{}/v1/chat/completions", settings.base_url.trim_end_matches('/')),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            api_key: api_key_from_env(settings.api_key_env.as_deref()),
        })
    }
}

impl Generator for ChatCompletionsGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage { role: "user", content: prompt }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        };
        let mut req = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        tracing::debug!(url = %self.url, prompt_chars = prompt.chars().count(), "requesting completion");
        let response = req.send().with_context(|| format!("POST {}", self.url))?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().unwrap_or_default();
            bail!("completion endpoint returned HTTP {}: {}", status, text);
        }
        let parsed: ChatResponse = response.json().context("decoding completion response")?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("completion response has no message content"))
    }
}

/// Returns the prompt itself; used when no model is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContextOnlyGenerator;

impl Generator for ContextOnlyGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        Ok(prompt.to_string())
    }
}

pub fn generator_from_settings(settings: &GenerationSettings) -> Result<Box<dyn Generator>> {
    if settings.enabled {
        tracing::info!(model = %settings.model, base_url = %settings.base_url, "answer generation enabled");
        Ok(Box::new(ChatCompletionsGenerator::from_settings(settings)?))
    } else {
        tracing::info!("answer generation disabled; answers echo the retrieved context");
        Ok(Box::new(ContextOnlyGenerator))
    }
}
