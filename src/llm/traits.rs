//! Text generation trait
//!
//! Every component that needs the model receives an `Arc<dyn TextGenerator>`
//! explicitly, so tests can substitute a deterministic stub.

use async_trait::async_trait;

use crate::core::Result;

/// Options for a single generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Temperature for sampling (0.0 - 1.0)
    pub temperature: f32,
    /// Stop sequences
    pub stop: Vec<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            max_tokens: 256,
            temperature: 0.0,
            stop: vec!["User:".to_string()],
        }
    }
}

impl GenerateOptions {
    /// Options with the given token budget and temperature
    pub fn new(max_tokens: u32, temperature: f32) -> Self {
        Self::default()
            .with_max_tokens(max_tokens)
            .with_temperature(temperature)
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the temperature, clamped into [0, 1]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 1.0);
        self
    }

    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = stop;
        self
    }
}

/// A blocking-per-request text completion service
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Complete `prompt`. Failures are not retried inside the call.
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String>;

    /// Get the generator name
    fn name(&self) -> &str;
}
