//! A single chat session
//!
//! Owns its rolling memory and orchestrator; nothing is shared between
//! sessions.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::agent::{presets, prompts, Orchestrator};
use crate::core::{Config, ParleyError, Result};
use crate::llm::{GenerateOptions, TextGenerator};
use crate::memory::{RollingMemory, Summarizer};

/// Where user input goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    /// Memory-backed direct generation
    #[default]
    Chat,
    /// Routed through the orchestrator
    Agents,
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMode::Chat => write!(f, "chat"),
            SessionMode::Agents => write!(f, "agents"),
        }
    }
}

impl FromStr for SessionMode {
    type Err = ParleyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "chat" => Ok(SessionMode::Chat),
            "agents" | "agent" => Ok(SessionMode::Agents),
            other => Err(ParleyError::config(format!(
                "Unknown mode '{}'. Available: chat, agents",
                other
            ))),
        }
    }
}

/// Chat session state
pub struct Session {
    config: Config,
    generator: Arc<dyn TextGenerator>,
    memory: RollingMemory,
    orchestrator: Orchestrator,
    mode: SessionMode,
    chat_options: GenerateOptions,
}

impl Session {
    /// Build a session with the default agent roster
    pub fn new(config: Config, generator: Arc<dyn TextGenerator>, mode: SessionMode) -> Result<Self> {
        let orchestrator = presets::default_orchestrator(generator.clone(), &config)?;
        Ok(Self::with_orchestrator(config, generator, mode, orchestrator))
    }

    /// Build a session around an existing orchestrator
    pub fn with_orchestrator(
        config: Config,
        generator: Arc<dyn TextGenerator>,
        mode: SessionMode,
        orchestrator: Orchestrator,
    ) -> Self {
        let mut memory = RollingMemory::new(config.memory.max_turns);
        if config.memory.summarize {
            memory = memory.with_summarizer(
                Summarizer::new(generator.clone()),
                config.memory.summary_trigger,
            );
        }

        let mut stop = config.generation.stop.clone();
        if !stop.iter().any(|s| s == "USER:") {
            stop.push("USER:".to_string());
        }
        let chat_options =
            GenerateOptions::new(config.generation.max_tokens, config.generation.temperature)
                .with_stop(stop);

        Self {
            config,
            generator,
            memory,
            orchestrator,
            mode,
            chat_options,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SessionMode) {
        tracing::info!(%mode, "Session mode changed");
        self.mode = mode;
    }

    pub fn memory(&self) -> &RollingMemory {
        &self.memory
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// Forget the conversation
    pub fn clear(&mut self) {
        self.memory.clear();
    }

    /// Answer one user message and record the exchange.
    ///
    /// Failed requests leave memory untouched.
    pub async fn respond(&mut self, input: &str) -> Result<String> {
        let reply = match self.mode {
            SessionMode::Chat => {
                let prompt = prompts::chat_prompt(
                    &self.config.chat.system_prompt,
                    &self.memory.render_context(),
                    input,
                );
                let reply = self.generator.generate(&prompt, &self.chat_options).await?;
                reply.trim().to_string()
            }
            SessionMode::Agents => self.orchestrator.route(input).await?,
        };

        self.memory.add_exchange(input, reply.as_str()).await;
        Ok(reply)
    }
}
