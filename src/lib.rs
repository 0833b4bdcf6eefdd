//! Parley - local chat with rolling memory and intent-routed agents
//!
//! A Rust chat loop over a local Ollama model. Conversation memory keeps the
//! last few exchanges verbatim and can compact older turns into summaries.
//! In agents mode each request is classified and routed to a scoped agent
//! that may call one of its tools.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, logging and error handling
//! - **LLM**: Text-generation abstraction with an Ollama backend
//! - **Memory**: Bounded rolling memory and the summarizer
//! - **Tools**: Tool definitions, the registry and the built-in tools
//! - **Agent**: Classifier, agents, decision strategies and the orchestrator
//! - **CLI**: Sessions, commands and the REPL
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use parley::{Config, OllamaClient, Session, SessionMode};
//!
//! #[tokio::main]
//! async fn main() -> parley::Result<()> {
//!     let config = Config::load()?;
//!     let client = Arc::new(OllamaClient::from_config(&config)?);
//!     client.ensure_ready().await?;
//!
//!     let mut session = Session::new(config, client, SessionMode::Agents)?;
//!     let reply = session.respond("What is 5 + 3?").await?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod memory;
pub mod tools;

// Re-export commonly used items
pub use agent::{Agent, Orchestrator};
pub use cli::{Repl, Session, SessionMode};
pub use core::{Config, ParleyError, Result};
pub use llm::{OllamaClient, TextGenerator};
pub use memory::RollingMemory;
