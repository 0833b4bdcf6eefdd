//! Timeout guard around a text generator
//!
//! Surfaces `GenerationTimeout` instead of letting a stuck model hang the session.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::core::{ParleyError, Result};
use crate::llm::traits::{GenerateOptions, TextGenerator};

/// Wraps another generator with a per-call deadline
pub struct TimeoutGenerator {
    inner: Arc<dyn TextGenerator>,
    limit: Duration,
}

impl TimeoutGenerator {
    pub fn new(inner: Arc<dyn TextGenerator>, limit: Duration) -> Self {
        Self { inner, limit }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }
}

#[async_trait]
impl TextGenerator for TimeoutGenerator {
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String> {
        match tokio::time::timeout(self.limit, self.inner.generate(prompt, options)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    generator = self.inner.name(),
                    limit = ?self.limit,
                    "Generation timed out"
                );
                Err(ParleyError::GenerationTimeout(self.limit))
            }
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowGenerator;

    #[async_trait]
    impl TextGenerator for SlowGenerator {
        async fn generate(&self, _prompt: &str, _options: &GenerateOptions) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("late".to_string())
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    struct FastGenerator;

    #[async_trait]
    impl TextGenerator for FastGenerator {
        async fn generate(&self, prompt: &str, _options: &GenerateOptions) -> Result<String> {
            Ok(format!("echo: {}", prompt))
        }

        fn name(&self) -> &str {
            "fast"
        }
    }

    #[tokio::test]
    async fn test_slow_generation_times_out() {
        let guard = TimeoutGenerator::new(Arc::new(SlowGenerator), Duration::from_millis(50));
        let err = guard
            .generate("hi", &GenerateOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ParleyError::GenerationTimeout(d) if d == Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn test_fast_generation_passes_through() {
        let guard = TimeoutGenerator::new(Arc::new(FastGenerator), Duration::from_secs(5));
        let out = guard
            .generate("hi", &GenerateOptions::default())
            .await
            .unwrap();
        assert_eq!(out, "echo: hi");
        assert_eq!(guard.name(), "fast");
    }
}
