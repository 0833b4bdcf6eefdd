//! Configuration management for Parley
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/parley/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::error::{ParleyError, Result};
use crate::core::logging;

/// Upper bound for the linear classification backoff step
pub const MAX_RETRY_BACKOFF_MS: u64 = 60_000;

/// Main configuration for Parley
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Ollama configuration
    pub ollama: OllamaConfig,
    /// Generation defaults
    pub generation: GenerationConfig,
    /// Rolling memory configuration
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Agent and orchestrator configuration
    #[serde(default)]
    pub agents: AgentsConfig,
    /// Plain chat configuration
    #[serde(default)]
    pub chat: ChatConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Ollama server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Host address (default: localhost)
    pub host: String,
    /// Port number (default: 11434)
    pub port: u16,
    /// Per-generation timeout in seconds
    pub timeout_secs: u64,
}

/// Text generation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Model name as known to Ollama
    pub model: String,
    /// Maximum tokens per response
    pub max_tokens: u32,
    /// Sampling temperature for chat replies (0.0 - 1.0)
    pub temperature: f32,
    /// Stop sequences applied to every generation
    #[serde(default)]
    pub stop: Vec<String>,
}

/// Rolling memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Number of user/assistant exchanges kept verbatim
    pub max_turns: usize,
    /// Whether evicted turns are compacted into summaries
    pub summarize: bool,
    /// Evicted turns needed before a summary is produced
    pub summary_trigger: usize,
}

/// How agents decide whether to call a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Match tool keywords against the request
    Keyword,
    /// Ask the model to pick a tool
    Llm,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Keyword => write!(f, "keyword"),
            StrategyKind::Llm => write!(f, "llm"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = ParleyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "keyword" | "keywords" => Ok(StrategyKind::Keyword),
            "llm" | "model" => Ok(StrategyKind::Llm),
            other => Err(ParleyError::config(format!(
                "Unknown strategy '{}'. Available: keyword, llm",
                other
            ))),
        }
    }
}

/// Agent and orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsConfig {
    /// Tool decision strategy for tool-backed agents
    pub strategy: StrategyKind,
    /// Rephrase tool output through the model instead of returning it verbatim
    pub narrate_tool_results: bool,
    /// Extra classification attempts after a generation failure
    pub classify_retries: u32,
    /// Linear backoff between classification attempts, in milliseconds
    pub retry_backoff_ms: u64,
}

/// Plain chat configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// System prompt placed before the conversation context
    pub system_prompt: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive
    pub level: String,
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: env::var("OLLAMA_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env_parse("OLLAMA_PORT", 11434),
            timeout_secs: 120,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: env::var("PARLEY_MODEL").unwrap_or_else(|_| "tinyllama".to_string()),
            max_tokens: env_parse("PARLEY_MAX_TOKENS", 256),
            temperature: env_parse("PARLEY_TEMPERATURE", 0.7),
            stop: vec!["User:".to_string()],
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_turns: env_parse("PARLEY_MEMORY_TURNS", 5),
            summarize: env_flag("PARLEY_SUMMARIZE", false),
            summary_trigger: 6,
        }
    }
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Llm,
            narrate_tool_results: true,
            classify_retries: 1,
            retry_backoff_ms: 250,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_prompt: "You are a helpful assistant. Use context from earlier in the \
                            conversation when it is relevant."
                .to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: env::var("PARLEY_LOG").unwrap_or_else(|_| "warn".to_string()),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("parley")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    ///
    /// A missing config file means defaults; a config file that does not parse
    /// or validate is an error.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::load_or_default(&Self::config_file())
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_path(path)
    }

    /// Load configuration from a specific file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ParleyError::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ParleyError::config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ParleyError::config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file();
        self.save_to_path(&path)?;
        Ok(path)
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| {
                    ParleyError::config(format!("Failed to create config dir: {}", e))
                })?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ParleyError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| ParleyError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Reject settings that would break invariants downstream
    pub fn validate(&self) -> Result<()> {
        if self.memory.max_turns == 0 {
            return Err(ParleyError::config("memory.max_turns must be at least 1"));
        }
        if self.memory.summarize && self.memory.summary_trigger == 0 {
            return Err(ParleyError::config(
                "memory.summary_trigger must be at least 1 when summarization is enabled",
            ));
        }
        if !(0.0..=1.0).contains(&self.generation.temperature) {
            return Err(ParleyError::config(format!(
                "generation.temperature must be within [0, 1], got {}",
                self.generation.temperature
            )));
        }
        if self.ollama.timeout_secs == 0 {
            return Err(ParleyError::config("ollama.timeout_secs must be positive"));
        }
        if self.agents.retry_backoff_ms > MAX_RETRY_BACKOFF_MS {
            return Err(ParleyError::config(format!(
                "agents.retry_backoff_ms must be at most {}, got {}",
                MAX_RETRY_BACKOFF_MS, self.agents.retry_backoff_ms
            )));
        }
        logging::check_level(&self.logging.level)
            .map_err(|e| ParleyError::config(format!("logging.level: {}", e)))?;
        Ok(())
    }

    /// Get the full Ollama API URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.ollama.host, self.ollama.port)
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        toml::to_string_pretty(&Config::default())
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }
}
