//! Default agent roster
//!
//! greeting, calculate, lookup and the out_of_scope fallback.

use std::sync::Arc;
use std::time::Duration;

use crate::agent::agent::{Agent, ResponseMode};
use crate::agent::classifier::{LlmIntentClassifier, OUT_OF_SCOPE};
use crate::agent::orchestrator::Orchestrator;
use crate::agent::strategy::{DecisionStrategy, KeywordStrategy, LlmStrategy};
use crate::core::{Config, Result, StrategyKind};
use crate::llm::{GenerateOptions, TextGenerator};
use crate::tools::{lookup, math};

fn strategy(kind: StrategyKind, generator: &Arc<dyn TextGenerator>) -> Box<dyn DecisionStrategy> {
    match kind {
        StrategyKind::Keyword => Box::new(KeywordStrategy),
        StrategyKind::Llm => Box::new(LlmStrategy::new(generator.clone())),
    }
}

fn response_mode(config: &Config) -> ResponseMode {
    if config.agents.narrate_tool_results {
        ResponseMode::Narrated
    } else {
        ResponseMode::Verbatim
    }
}

fn answer_options(config: &Config) -> GenerateOptions {
    GenerateOptions::new(150, config.generation.temperature).with_stop(config.generation.stop.clone())
}

pub fn greeting_agent(generator: Arc<dyn TextGenerator>, config: &Config) -> Result<Agent> {
    Agent::builder("Greeting Agent")
        .description("Greetings, thanks, goodbyes and small talk")
        .persona("You are a friendly assistant. Respond warmly to the user's greeting or small talk.")
        .options(answer_options(config))
        .generator(generator)
        .build()
}

pub fn calculator_agent(generator: Arc<dyn TextGenerator>, config: &Config) -> Result<Agent> {
    Agent::builder("Calculator Agent")
        .description("Math problems: arithmetic, square roots, powers and trigonometry")
        .persona("You are a precise math assistant. If you cannot compute the answer, say what is missing.")
        .tool(math::calculator())
        .tool(math::advanced_math())
        .tool(math::trigonometry())
        .strategy(strategy(config.agents.strategy, &generator))
        .response_mode(response_mode(config))
        .options(answer_options(config))
        .generator(generator)
        .build()
}

pub fn lookup_agent(generator: Arc<dyn TextGenerator>, config: &Config) -> Result<Agent> {
    Agent::builder("Lookup Agent")
        .description("Weather for a city and short definitions of programming and AI topics")
        .persona("You are a knowledgeable assistant. Answer factual questions briefly.")
        .tool(lookup::weather())
        .tool(lookup::search())
        .strategy(strategy(config.agents.strategy, &generator))
        .response_mode(response_mode(config))
        .options(answer_options(config))
        .generator(generator)
        .build()
}

pub fn out_of_scope_agent() -> Result<Agent> {
    Agent::builder("OutOfScope Agent")
        .description("Anything the other agents cannot handle")
        .fallback()
        .build()
}

/// Orchestrator with the default roster, classifying through `generator`
pub fn default_orchestrator(generator: Arc<dyn TextGenerator>, config: &Config) -> Result<Orchestrator> {
    let classifier = LlmIntentClassifier::new(generator.clone());
    let mut orchestrator = Orchestrator::new(Box::new(classifier)).with_retry(
        config.agents.classify_retries,
        Duration::from_millis(config.agents.retry_backoff_ms),
    );

    orchestrator.register_agent("greeting", greeting_agent(generator.clone(), config)?)?;
    orchestrator.register_agent("calculate", calculator_agent(generator.clone(), config)?)?;
    orchestrator.register_agent("lookup", lookup_agent(generator, config)?)?;
    orchestrator.register_agent(OUT_OF_SCOPE, out_of_scope_agent()?)?;

    Ok(orchestrator)
}
