//! LLM module - text generation backends
//!
//! Provides the text-generation abstraction with Ollama as the primary backend.

pub mod guard;
pub mod ollama;
pub mod scripted;
pub mod traits;

pub use guard::TimeoutGenerator;
pub use ollama::OllamaClient;
pub use scripted::ScriptedGenerator;
pub use traits::{GenerateOptions, TextGenerator};
