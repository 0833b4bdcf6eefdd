//! Custom error types for Parley
//!
//! Provides a unified error handling system across all modules.

use std::time::Duration;

use thiserror::Error;

/// Main error type for Parley operations
#[derive(Error, Debug)]
pub enum ParleyError {
    /// The text-generation service could not produce output
    #[error("Generation failed: {0}")]
    Generation(String),

    /// The text-generation service did not answer in time
    #[error("Generation timed out after {0:?}")]
    GenerationTimeout(Duration),

    /// A tool was invoked with missing or malformed arguments
    #[error("Invalid arguments for tool '{tool}': {reason}")]
    InvalidToolArguments { tool: String, reason: String },

    /// Structured classifier output could not be parsed
    #[error("Could not classify intent: {0}")]
    UnclassifiableIntent(String),

    /// No agent is registered for a classified label
    #[error("No agent registered for intent '{0}'")]
    UnroutableIntent(String),

    /// The orchestrator has no fallback agent to resolve unknown intents
    #[error("No fallback agent registered")]
    NoFallbackAgent,

    /// Model not available
    #[error("Model '{0}' not available in Ollama. Run: ollama pull {0}")]
    ModelNotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Logger initialisation errors
    #[error("Logger error: {0}")]
    Logger(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for Parley operations
pub type Result<T> = std::result::Result<T, ParleyError>;

impl ParleyError {
    /// Create a generation failure
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid tool arguments error
    pub fn invalid_args(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidToolArguments {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Whether the failure came from the text-generation service.
    ///
    /// These are the only errors a caller may retry.
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            Self::Generation(_) | Self::GenerationTimeout(_) | Self::ModelNotFound(_)
        )
    }

    /// User-facing message for a request that could not be completed
    pub fn apology(&self) -> String {
        match self {
            Self::GenerationTimeout(_) => {
                "Sorry, the model took too long to answer. Please try again.".to_string()
            }
            Self::Generation(_) | Self::ModelNotFound(_) | Self::Http(_) => {
                "Sorry, I couldn't reach the language model. Please try again shortly.".to_string()
            }
            Self::NoFallbackAgent => {
                "Sorry, I'm not set up to handle that request.".to_string()
            }
            _ => "Sorry, something went wrong while handling your request.".to_string(),
        }
    }
}
