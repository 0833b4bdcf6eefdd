//! Orchestration tests
//!
//! Routing, tool invocation and fallback behavior through the public API.

use std::sync::Arc;

use async_trait::async_trait;
use parley::agent::{
    presets, Agent, IntentClassifier, Orchestrator, RequestState, Resolution, ResponseMode,
    OUT_OF_SCOPE,
};
use parley::core::{Config, Entities, IntentClassification, Result, StrategyKind};
use parley::llm::{ScriptedGenerator, TextGenerator};
use parley::tools::{math, ToolArgs};
use parley::{Session, SessionMode};

/// Classifies every request with the same label
struct FixedClassifier(&'static str);

#[async_trait]
impl IntentClassifier for FixedClassifier {
    async fn classify(&self, _request: &str) -> Result<IntentClassification> {
        Ok(IntentClassification::new(self.0, Entities::new(), 1.0))
    }
}

fn keyword_config() -> Config {
    let mut config = Config::default();
    config.agents.strategy = StrategyKind::Keyword;
    config.agents.narrate_tool_results = false;
    config
}

fn fixed_orchestrator(label: &'static str) -> Orchestrator {
    let generator: Arc<dyn TextGenerator> =
        Arc::new(ScriptedGenerator::with_fallback("I can only help with math."));
    let config = keyword_config();

    let mut orchestrator = Orchestrator::new(Box::new(FixedClassifier(label)));
    orchestrator
        .register_agent("calculate", presets::calculator_agent(generator, &config).unwrap())
        .unwrap();
    orchestrator
        .register_agent(OUT_OF_SCOPE, presets::out_of_scope_agent().unwrap())
        .unwrap();
    orchestrator
}

#[test]
fn tools_are_idempotent() {
    let calculator = math::calculator();
    let mut args = ToolArgs::new();
    args.insert("expression".to_string(), "12 * 4".to_string());

    let first = calculator.invoke(&args).unwrap();
    for _ in 0..5 {
        assert_eq!(calculator.invoke(&args).unwrap(), first);
    }
    assert_eq!(first, "12 * 4 = 48");
}

#[tokio::test]
async fn fixed_label_always_reaches_the_same_agent() {
    let orchestrator = fixed_orchestrator("calculate");
    for request in ["2 + 2", "tell me a joke", "", "what is the square root of 16"] {
        let outcome = orchestrator.route_detailed(request).await.unwrap();
        assert_eq!(outcome.agent, "Calculator Agent");
        assert_eq!(outcome.classification.intent, "calculate");
    }
}

#[tokio::test]
async fn unknown_label_goes_to_fallback() {
    let orchestrator = fixed_orchestrator("book_flight");
    let outcome = orchestrator.route_detailed("book me a flight").await.unwrap();

    assert_eq!(outcome.agent, "OutOfScope Agent");
    assert_eq!(outcome.resolution, Resolution::Declined);
    assert!(outcome.response.contains("- calculate:"));
    assert_eq!(outcome.trace.current(), RequestState::Responded);
}

#[tokio::test]
async fn arithmetic_request_is_answered_by_the_calculator() {
    let generator = Arc::new(
        ScriptedGenerator::new()
            .reply(r#"{"intent": "calculate", "confidence": 0.95, "entities": {"expression": "5 + 3"}}"#)
            .reply(r#"{"tool_name": "calculator", "arguments": {"expression": "5 + 3"}}"#)
            .reply("5 plus 3 equals 8."),
    );
    let mut session = Session::new(Config::default(), generator.clone(), SessionMode::Agents).unwrap();

    let reply = session.respond("What is 5 + 3?").await.unwrap();

    assert!(reply.contains('8'));
    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 3);
    assert!(prompts[2].contains("5 + 3 = 8"));
}

#[tokio::test]
async fn arithmetic_with_keyword_strategy_skips_the_model_for_tools() {
    let generator = Arc::new(ScriptedGenerator::new().reply(
        r#"{"intent": "calculate", "confidence": 0.9, "entities": {}}"#,
    ));
    let mut session = Session::new(keyword_config(), generator.clone(), SessionMode::Agents).unwrap();

    let reply = session.respond("What is 5 + 3?").await.unwrap();

    assert_eq!(reply, "5 + 3 = 8");
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn unsupported_request_lists_capabilities() {
    let generator = Arc::new(ScriptedGenerator::new().reply(
        r#"{"intent": "out_of_scope", "confidence": 0.8, "entities": {}}"#,
    ));
    let orchestrator = presets::default_orchestrator(generator, &Config::default()).unwrap();

    let outcome = orchestrator.route_detailed("book me a flight").await.unwrap();

    assert_eq!(outcome.agent, "OutOfScope Agent");
    assert!(outcome
        .response
        .starts_with("Sorry, I can't help with that request. Here is what I can do:"));
    for label in ["greeting", "calculate", "lookup"] {
        assert!(outcome.response.contains(&format!("- {}:", label)));
    }
    assert!(!outcome.response.contains("- out_of_scope:"));
}

#[tokio::test]
async fn unparseable_classification_falls_back() {
    let generator = Arc::new(ScriptedGenerator::new().reply("I think it's about flights!"));
    let orchestrator = presets::default_orchestrator(generator, &Config::default()).unwrap();

    let outcome = orchestrator.route_detailed("book me a flight").await.unwrap();
    assert_eq!(outcome.classification.intent, OUT_OF_SCOPE);
    assert_eq!(outcome.classification.confidence, 0.0);
    assert_eq!(outcome.agent, "OutOfScope Agent");
}

#[tokio::test]
async fn direct_answer_when_no_tool_matches() {
    let generator: Arc<dyn TextGenerator> =
        Arc::new(ScriptedGenerator::with_fallback("Hello! How can I help?"));
    let agent = Agent::builder("Greeting Agent")
        .description("Greetings")
        .response_mode(ResponseMode::Verbatim)
        .generator(generator)
        .build()
        .unwrap();

    let reply = agent.handle("hi there", &Entities::new()).await.unwrap();
    assert_eq!(reply.resolution, Resolution::DirectAnswer);
    assert_eq!(reply.text, "Hello! How can I help?");
}
