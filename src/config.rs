use std::env;

use crate::error::ServiceError;

pub const DEFAULT_SERVICE_KEY: &str = "default-api-key-change-in-production";
const PLACEHOLDER_OPENAI_KEY: &str = "your-openai-api-key-here";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub service_api_key: String,
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            service_api_key: DEFAULT_SERVICE_KEY.to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ServiceError> {
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ServiceError::Config(format!("invalid PORT {:?}: {}", raw, e)))?,
            Err(_) => 8000,
        };

        Ok(Self {
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string()),
            service_api_key: env::var("AI_SERVICE_API_KEY")
                .unwrap_or_else(|_| DEFAULT_SERVICE_KEY.to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
        })
    }

    // Only keys that look like real OpenAI keys count
    pub fn usable_openai_key(&self) -> Option<&str> {
        self.openai_api_key
            .as_deref()
            .filter(|k| *k != PLACEHOLDER_OPENAI_KEY && k.starts_with("sk-"))
    }

    pub fn service_key_is_custom(&self) -> bool {
        self.service_api_key != DEFAULT_SERVICE_KEY
    }
}
