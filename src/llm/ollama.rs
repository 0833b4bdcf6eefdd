//! Ollama client implementation
//!
//! Async HTTP client for the Ollama completion API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::{Config, ParleyError, Result};
use crate::llm::traits::{GenerateOptions, TextGenerator};

/// Ollama API client bound to one model
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

/// Ollama generate request
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    options: OllamaOptions<'a>,
    stream: bool,
}

/// Ollama generation options
#[derive(Debug, Serialize)]
struct OllamaOptions<'a> {
    temperature: f32,
    num_predict: u32,
    #[serde(skip_serializing_if = "no_stop")]
    stop: &'a [String],
}

fn no_stop(stop: &&[String]) -> bool {
    stop.is_empty()
}

/// Ollama generate response (non-streaming)
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

/// Ollama models list response
#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Vec<ModelInfo>,
}

/// Model information
#[derive(Debug, Deserialize)]
struct ModelInfo {
    name: String,
}

impl OllamaClient {
    /// Create a new Ollama client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.ollama.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.ollama_url(),
            model: config.generation.model.clone(),
        })
    }

    /// Create a client with custom base URL and model
    pub fn with_base_url(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    /// Model used for every generation
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Base URL of the Ollama server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn connect_error(&self, e: reqwest::Error) -> ParleyError {
        if e.is_connect() {
            ParleyError::generation(format!(
                "Cannot connect to Ollama at {}. Is it running?",
                self.base_url
            ))
        } else if e.is_timeout() {
            ParleyError::generation(format!("Request to Ollama timed out: {}", e))
        } else {
            ParleyError::from(e)
        }
    }

    /// List available models
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|e| self.connect_error(e))?;

        if !response.status().is_success() {
            return Err(ParleyError::generation("Failed to list models"));
        }

        let models_response: ModelsResponse = response.json().await?;
        Ok(models_response.models.into_iter().map(|m| m.name).collect())
    }

    /// Check if the configured model is available
    pub async fn is_model_available(&self) -> Result<bool> {
        let models = self.list_models().await?;
        Ok(models
            .iter()
            .any(|m| m == &self.model || m.split(':').next() == self.model.split(':').next()))
    }

    /// Verify the server is reachable and the model is pulled
    pub async fn ensure_ready(&self) -> Result<()> {
        if !self.is_model_available().await? {
            return Err(ParleyError::ModelNotFound(self.model.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            options: OllamaOptions {
                temperature: options.temperature,
                num_predict: options.max_tokens,
                stop: &options.stop,
            },
            stream: false,
        };

        tracing::trace!(model = %self.model, prompt_len = prompt.len(), "Sending generate request");

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.connect_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 404 && error_text.contains("not found") {
                return Err(ParleyError::ModelNotFound(self.model.clone()));
            }

            return Err(ParleyError::generation(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let response_text = response.text().await.map_err(|e| self.connect_error(e))?;
        let parsed: GenerateResponse = serde_json::from_str(&response_text)
            .map_err(|e| ParleyError::generation(format!("Failed to parse response: {}", e)))?;

        tracing::debug!(
            prompt_tokens = ?parsed.prompt_eval_count,
            completion_tokens = ?parsed.eval_count,
            "Generation complete"
        );

        Ok(parsed.response.trim().to_string())
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
