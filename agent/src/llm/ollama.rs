//! Ollama LLM implementation
//!
//! Talks to the /api/generate endpoint over direct HTTP with hand-rolled
//! request types, so the sampling options stay under our control.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::Llm;

/// Sampling temperature low enough to keep replies deterministic-ish
const DEFAULT_TEMPERATURE: f32 = 0.1;

/// One request is expected to finish well within this window
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Completion request for the Ollama generate endpoint
#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

/// Response from the Ollama generate endpoint
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Ollama client over direct HTTP
pub struct OllamaClient {
    base_url: String,
    http_client: reqwest::Client,
    model: String,
    temperature: f32,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(url: &str, model: &str) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: url.trim_end_matches('/').to_string(),
            http_client,
            model: model.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Override the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }
}

#[async_trait]
impl Llm for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        let url = self.endpoint();
        tracing::debug!(model = %self.model, chars = prompt.len(), "sending prompt to {}", url);

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed to send HTTP request to Ollama")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Ollama API error {}: {}", status, body));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        Ok(body.response.trim().to_string())
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Llm;

    #[test]
    fn request_carries_model_prompt_and_temperature() {
        let request = GenerateRequest {
            model: "llama3.2".to_string(),
            prompt: "hello".to_string(),
            stream: false,
            options: GenerateOptions { temperature: 0.1 },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3.2");
        assert_eq!(json["prompt"], "hello");
        assert_eq!(json["stream"], false);
        let temperature = json["options"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.1).abs() < 1e-6);
    }

    #[test]
    fn endpoint_tolerates_a_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", "llama3.2");
        assert_eq!(client.endpoint(), "http://localhost:11434/api/generate");
        assert_eq!(client.model(), "llama3.2");
    }

    #[test]
    fn empty_response_body_decodes_to_empty_text() {
        let body: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(body.response, "");
    }
}
