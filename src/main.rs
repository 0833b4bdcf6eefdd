//! Parley - local chat with rolling memory and intent-routed agents
//!
//! Main entry point for the CLI application.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use parley::core::{logging, StrategyKind};
use parley::llm::{OllamaClient, TextGenerator, TimeoutGenerator};
use parley::{Config, Repl, Session, SessionMode};

/// Parley - local chat with rolling memory and intent-routed agents
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Ollama model name
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Session mode: chat or agents
    #[arg(long, default_value = "chat")]
    mode: SessionMode,

    /// Exchanges kept verbatim in memory
    #[arg(long)]
    max_turns: Option<usize>,

    /// Summarize turns that fall out of memory
    #[arg(long)]
    summarize: bool,

    /// Evicted turns needed before a summary is produced
    #[arg(long)]
    summary_trigger: Option<usize>,

    /// Tool decision strategy: keyword or llm
    #[arg(long)]
    strategy: Option<StrategyKind>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    init_config: bool,

    /// Single prompt mode (non-interactive)
    #[arg(long, short = 'p')]
    prompt: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Build configuration
    let mut config = Config::load().with_context(|| {
        format!(
            "failed to load {}; fix or remove it to use defaults",
            Config::config_file().display()
        )
    })?;

    // Apply CLI overrides
    if let Some(ref model) = args.model {
        config.generation.model = model.clone();
    }
    if let Some(max_turns) = args.max_turns {
        config.memory.max_turns = max_turns;
    }
    if args.summarize {
        config.memory.summarize = true;
    }
    if let Some(trigger) = args.summary_trigger {
        config.memory.summary_trigger = trigger;
    }
    if let Some(strategy) = args.strategy {
        config.agents.strategy = strategy;
    }
    if args.debug {
        config.logging.level = "debug".to_string();
    }

    config.validate().context("invalid configuration")?;
    logging::init(&config.logging.level, args.debug).context("failed to initialise logging")?;

    if args.init_config {
        let path = config.save().context("failed to write config file")?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    let client = OllamaClient::from_config(&config)?;
    client
        .ensure_ready()
        .await
        .with_context(|| format!("Ollama is not ready at {}", config.ollama_url()))?;

    let client: Arc<dyn TextGenerator> = Arc::new(client);
    let generator: Arc<dyn TextGenerator> = Arc::new(TimeoutGenerator::new(
        client,
        Duration::from_secs(config.ollama.timeout_secs),
    ));

    tracing::info!(model = %config.generation.model, mode = %args.mode, "Starting session");
    let mut session = Session::new(config, generator, args.mode)?;

    // Single prompt mode
    if let Some(prompt) = args.prompt {
        match session.respond(&prompt).await {
            Ok(response) => println!("{}", response),
            Err(e) => {
                tracing::error!(error = %e, "Request failed");
                println!("{}", e.apology());
            }
        }
        return Ok(());
    }

    // Interactive REPL mode
    let mut repl = Repl::new(session);
    repl.run().await?;

    Ok(())
}
