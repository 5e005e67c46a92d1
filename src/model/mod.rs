use std::sync::Arc;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use log::{info, debug, warn};

use crate::config::Config;
use crate::web::models::Message;

pub const MODEL_ID: &str = "gpt-4o-mini";
pub const TEMPERATURE: f64 = 0.7;

// Turns role-tagged messages into completion text
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        messages: &[Message],
        model: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String>;
}

// Client for an OpenAI-compatible chat completions API
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(
        &self,
        messages: &[Message],
        model: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let payload = json!({
            "model": model,
            "messages": messages,
            "temperature": temperature,
            "max_tokens": max_tokens
        });

        info!("Sending {} messages to {} (max_tokens: {})", messages.len(), model, max_tokens);
        debug!("Payload: {}", payload);

        let response = self.client.post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow::anyhow!("API request failed ({}): {}", status, error_text));
        }

        let response_json: Value = response.json().await?;
        debug!("Response JSON: {}", response_json);

        let content = response_json
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .ok_or_else(|| anyhow::anyhow!("Failed to extract content from response"))?;

        info!("Response length: {} characters", content.len());
        Ok(content.to_string())
    }
}

// None means every request takes the fallback path
pub fn build_provider(config: &Config) -> Option<Arc<dyn CompletionProvider>> {
    let Some(key) = config.usable_openai_key() else {
        if config.openai_api_key.is_some() {
            warn!("OpenAI API key format appears incorrect (should start with 'sk-')");
        }
        warn!("OpenAI API key not set. Service will work with fallback responses.");
        return None;
    };

    match OpenAiClient::new(&config.openai_base_url, key) {
        Ok(client) => {
            info!("OpenAI API key configured, using {}", config.openai_base_url);
            Some(Arc::new(client))
        }
        Err(e) => {
            warn!("Failed to initialize OpenAI client: {}. Service will work with fallback responses", e);
            None
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_provider_without_usable_key() {
        let mut config = Config::default();
        assert!(build_provider(&config).is_none());
        config.openai_api_key = Some("not-a-key".into());
        assert!(build_provider(&config).is_none());
    }

    #[test]
    fn provider_built_for_sk_key() {
        let config = Config {
            openai_api_key: Some("sk-test".into()),
            ..Config::default()
        };
        assert!(build_provider(&config).is_some());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = OpenAiClient::new("http://localhost:8081/", "sk-x").unwrap();
        assert_eq!(client.base_url, "http://localhost:8081");
    }
}
