//! Agent orchestrator
//!
//! Classifies each request, routes it to the agent registered for the intent
//! (or the fallback agent), and returns that agent's reply.

use std::fmt;
use std::time::Duration;

use crate::agent::agent::{Agent, AgentReply, Resolution};
use crate::agent::classifier::{normalize_label, IntentClassifier, OUT_OF_SCOPE};
use crate::agent::state::{RequestState, RequestTrace};
use crate::core::{IntentClassification, ParleyError, Result};

/// Everything known about one routed request
#[derive(Debug, Clone)]
pub struct RouteOutcome {
    pub classification: IntentClassification,
    /// Name of the agent that answered
    pub agent: String,
    pub resolution: Resolution,
    pub response: String,
    pub trace: RequestTrace,
}

/// One registered agent as reported by [`Orchestrator::status`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentStatus {
    pub label: String,
    pub name: String,
    pub tools: Vec<String>,
    pub strategy: String,
    pub fallback: bool,
}

/// Registration state of an orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorStatus {
    /// Agents in registration order
    pub agents: Vec<AgentStatus>,
    /// Label of the fallback agent, if one is registered
    pub fallback: Option<String>,
}

impl OrchestratorStatus {
    pub fn labels(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.label.as_str()).collect()
    }
}

impl fmt::Display for OrchestratorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Registered intents: {}", self.agents.len())?;
        for agent in &self.agents {
            let tools = if agent.tools.is_empty() {
                "no tools".to_string()
            } else {
                agent.tools.join(", ")
            };
            let marker = if agent.fallback { " (fallback)" } else { "" };
            writeln!(
                f,
                "  {:<14} {}{} [{}]",
                agent.label, agent.name, marker, tools
            )?;
        }
        match &self.fallback {
            Some(label) => write!(f, "Fallback intent: {}", label),
            None => write!(f, "Fallback intent: none registered"),
        }
    }
}

/// Routes classified requests to agents
pub struct Orchestrator {
    classifier: Box<dyn IntentClassifier>,
    /// (label, agent) in registration order
    agents: Vec<(String, Agent)>,
    fallback_label: String,
    classify_retries: u32,
    retry_backoff: Duration,
}

impl Orchestrator {
    pub fn new(classifier: Box<dyn IntentClassifier>) -> Self {
        Self {
            classifier,
            agents: Vec::new(),
            fallback_label: OUT_OF_SCOPE.to_string(),
            classify_retries: 0,
            retry_backoff: Duration::ZERO,
        }
    }

    /// Retry classification after generation failures, waiting
    /// `backoff * attempt` between attempts
    pub fn with_retry(mut self, retries: u32, backoff: Duration) -> Self {
        self.classify_retries = retries;
        self.retry_backoff = backoff;
        self
    }

    /// Register `agent` for `label`, replacing any agent already there.
    ///
    /// A fallback agent becomes the target for unmapped intents.
    /// Labels are stored trimmed and lowercase, matching classifier output.
    pub fn register_agent(&mut self, label: &str, agent: Agent) -> Result<Option<Agent>> {
        let label = normalize_label(label);
        if label.is_empty() {
            return Err(ParleyError::config("intent label cannot be empty"));
        }
        self.classifier.register_intent(&label, agent.description())?;

        if agent.is_fallback() {
            self.fallback_label = label.clone();
        }

        tracing::info!(agent = agent.name(), intent = %label, "Registered agent");
        let replaced = match self.agents.iter_mut().find(|(l, _)| *l == label) {
            Some(slot) => Some(std::mem::replace(&mut slot.1, agent)),
            None => {
                self.agents.push((label, agent));
                None
            }
        };

        self.refresh_capabilities();
        Ok(replaced)
    }

    /// Remove the agent registered for `label`
    pub fn unregister_agent(&mut self, label: &str) -> Option<Agent> {
        let label = normalize_label(label);
        let position = self.agents.iter().position(|(l, _)| *l == label)?;
        let (_, agent) = self.agents.remove(position);
        self.classifier.unregister_intent(&label);
        self.refresh_capabilities();
        Some(agent)
    }

    /// Keep the fallback agent's capability list in sync with the roster
    fn refresh_capabilities(&mut self) {
        let capabilities: Vec<(String, String)> = self
            .agents
            .iter()
            .filter(|(_, agent)| !agent.is_fallback())
            .map(|(label, agent)| (label.clone(), agent.description().to_string()))
            .collect();

        for (_, agent) in self.agents.iter_mut().filter(|(_, a)| a.is_fallback()) {
            agent.set_capabilities(capabilities.clone());
        }
    }

    pub fn agent(&self, label: &str) -> Option<&Agent> {
        let label = normalize_label(label);
        self.agents
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, agent)| agent)
    }

    fn fallback(&self) -> Option<&Agent> {
        self.agent(&self.fallback_label)
            .filter(|agent| agent.is_fallback())
    }

    /// Registered labels, agent names and tool names
    pub fn status(&self) -> OrchestratorStatus {
        OrchestratorStatus {
            agents: self
                .agents
                .iter()
                .map(|(label, agent)| AgentStatus {
                    label: label.clone(),
                    name: agent.name().to_string(),
                    tools: agent.tools().names().into_iter().map(String::from).collect(),
                    strategy: agent.strategy_name().to_string(),
                    fallback: agent.is_fallback(),
                })
                .collect(),
            fallback: self.fallback().map(|_| self.fallback_label.clone()),
        }
    }

    /// Route a request and return the reply text
    pub async fn route(&self, request: &str) -> Result<String> {
        Ok(self.route_detailed(request).await?.response)
    }

    /// Route a request and report how it was handled
    pub async fn route_detailed(&self, request: &str) -> Result<RouteOutcome> {
        let mut trace = RequestTrace::new();

        let classification = self.classify_with_retry(request).await?;
        trace.advance(RequestState::Classified)?;

        let agent = match self.agent(&classification.intent) {
            Some(agent) => agent,
            None => {
                let unroutable = ParleyError::UnroutableIntent(classification.intent.clone());
                tracing::debug!("{}; using fallback", unroutable);
                self.fallback().ok_or(ParleyError::NoFallbackAgent)?
            }
        };
        trace.advance(RequestState::Routed)?;
        tracing::info!(intent = %classification.intent, agent = agent.name(), "Routing request");

        let AgentReply {
            agent: agent_name,
            text,
            resolution,
        } = agent.handle(request, &classification.entities).await?;

        trace.advance(match resolution {
            Resolution::ToolInvoked { .. } => RequestState::ToolInvoked,
            Resolution::DirectAnswer | Resolution::Declined => RequestState::DirectAnswer,
        })?;
        trace.advance(RequestState::Responded)?;
        tracing::debug!(%trace, "Request complete");

        Ok(RouteOutcome {
            classification,
            agent: agent_name,
            resolution,
            response: text,
            trace,
        })
    }

    /// Linear backoff before retry `attempt`, saturating instead of overflowing
    fn backoff(&self, attempt: u32) -> Duration {
        self.retry_backoff
            .checked_mul(attempt)
            .unwrap_or(Duration::MAX)
    }

    async fn classify_with_retry(&self, request: &str) -> Result<IntentClassification> {
        let mut attempt = 0;
        loop {
            match self.classifier.classify(request).await {
                Ok(classification) => return Ok(classification),
                Err(e) if e.is_generation_failure() && attempt < self.classify_retries => {
                    attempt += 1;
                    let wait = self.backoff(attempt);
                    tracing::warn!(attempt, ?wait, "Classification failed: {}; retrying", e);
                    tokio::time::sleep(wait).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::core::Entities;
    use crate::llm::ScriptedGenerator;
    use crate::tools::math;

    /// Always returns the same label
    struct FixedClassifier(&'static str);

    #[async_trait]
    impl IntentClassifier for FixedClassifier {
        async fn classify(&self, _request: &str) -> Result<IntentClassification> {
            Ok(IntentClassification::new(self.0, Entities::new(), 0.9))
        }
    }

    /// Fails a set number of times before classifying
    struct FlakyClassifier {
        failures: usize,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl IntentClassifier for FlakyClassifier {
        async fn classify(&self, _request: &str) -> Result<IntentClassification> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(ParleyError::generation("model busy"))
            } else {
                Ok(IntentClassification::new("calculate", Entities::new(), 0.9))
            }
        }
    }

    fn calculator_agent() -> Agent {
        Agent::builder("Calculator Agent")
            .description("Solves math problems")
            .tool(math::calculator())
            .response_mode(crate::agent::ResponseMode::Verbatim)
            .generator(Arc::new(ScriptedGenerator::with_fallback("I can only do math.")))
            .build()
            .unwrap()
    }

    fn fallback_agent() -> Agent {
        Agent::builder("OutOfScope Agent")
            .description("Handles unsupported requests")
            .fallback()
            .build()
            .unwrap()
    }

    fn orchestrator(classifier: Box<dyn IntentClassifier>) -> Orchestrator {
        let mut orchestrator = Orchestrator::new(classifier);
        orchestrator.register_agent("calculate", calculator_agent()).unwrap();
        orchestrator.register_agent(OUT_OF_SCOPE, fallback_agent()).unwrap();
        orchestrator
    }

    #[tokio::test]
    async fn test_routes_to_registered_agent() {
        let orchestrator = orchestrator(Box::new(FixedClassifier("calculate")));
        let outcome = orchestrator.route_detailed("5+3").await.unwrap();
        assert_eq!(outcome.agent, "Calculator Agent");
        assert_eq!(outcome.response, "5 + 3 = 8");
        assert_eq!(
            outcome.trace.states(),
            [
                RequestState::Received,
                RequestState::Classified,
                RequestState::Routed,
                RequestState::ToolInvoked,
                RequestState::Responded
            ]
        );
    }

    #[tokio::test]
    async fn test_unmapped_label_uses_fallback() {
        let orchestrator = orchestrator(Box::new(FixedClassifier("weather")));
        let outcome = orchestrator.route_detailed("rain?").await.unwrap();
        assert_eq!(outcome.agent, "OutOfScope Agent");
        assert_eq!(outcome.resolution, Resolution::Declined);
        assert_eq!(
            outcome.response,
            "Sorry, I can't help with that request. Here is what I can do:\n- calculate: Solves math problems"
        );
    }

    #[tokio::test]
    async fn test_missing_fallback_is_an_error() {
        let mut orchestrator = Orchestrator::new(Box::new(FixedClassifier("weather")));
        orchestrator.register_agent("calculate", calculator_agent()).unwrap();
        let err = orchestrator.route("rain?").await.unwrap_err();
        assert!(matches!(err, ParleyError::NoFallbackAgent));
    }

    #[tokio::test]
    async fn test_classification_retries_generation_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let classifier = FlakyClassifier {
            failures: 2,
            calls: calls.clone(),
        };
        let orchestrator =
            orchestrator(Box::new(classifier)).with_retry(2, Duration::from_millis(1));

        assert_eq!(orchestrator.route("5+3").await.unwrap(), "5 + 3 = 8");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let calls = Arc::new(AtomicUsize::new(0));
        let classifier = FlakyClassifier {
            failures: 5,
            calls: calls.clone(),
        };
        let orchestrator =
            orchestrator(Box::new(classifier)).with_retry(1, Duration::from_millis(1));

        let err = orchestrator.route("5+3").await.unwrap_err();
        assert!(err.is_generation_failure());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_status_lists_labels_and_tools() {
        let orchestrator = orchestrator(Box::new(FixedClassifier("calculate")));
        let status = orchestrator.status();
        assert_eq!(status.labels(), vec!["calculate", OUT_OF_SCOPE]);
        assert_eq!(status.agents[0].tools, vec!["calculator"]);
        assert_eq!(status.fallback.as_deref(), Some(OUT_OF_SCOPE));

        let text = status.to_string();
        assert!(text.contains("Calculator Agent"));
        assert!(text.contains("(fallback)"));
    }

    #[test]
    fn test_reregistering_label_replaces_agent() {
        let mut orchestrator = orchestrator(Box::new(FixedClassifier("calculate")));
        let replaced = orchestrator
            .register_agent("calculate", calculator_agent())
            .unwrap();
        assert!(replaced.is_some());
        assert_eq!(orchestrator.status().agents.len(), 2);

        assert!(orchestrator.unregister_agent("calculate").is_some());
        assert_eq!(orchestrator.status().labels(), vec![OUT_OF_SCOPE]);
    }

    #[tokio::test]
    async fn test_mixed_case_label_routes() {
        let generator = Arc::new(ScriptedGenerator::new().reply(
            r#"{"intent": "Calculate", "confidence": 0.9, "entities": {}}"#,
        ));
        let classifier = crate::agent::LlmIntentClassifier::new(generator);
        let mut orchestrator = Orchestrator::new(Box::new(classifier));
        orchestrator.register_agent(" Calculate ", calculator_agent()).unwrap();
        orchestrator.register_agent(OUT_OF_SCOPE, fallback_agent()).unwrap();

        assert_eq!(orchestrator.status().labels(), vec!["calculate", OUT_OF_SCOPE]);
        assert!(orchestrator.agent("CALCULATE").is_some());

        let outcome = orchestrator.route_detailed("5+3").await.unwrap();
        assert_eq!(outcome.agent, "Calculator Agent");
        assert_eq!(outcome.response, "5 + 3 = 8");

        assert!(orchestrator.unregister_agent("CALCULATE").is_some());
        assert!(orchestrator.agent("calculate").is_none());
    }

    #[test]
    fn test_blank_label_is_rejected() {
        let mut orchestrator = Orchestrator::new(Box::new(FixedClassifier("calculate")));
        assert!(orchestrator.register_agent("   ", calculator_agent()).is_err());
    }

    #[test]
    fn test_backoff_saturates() {
        let orchestrator = Orchestrator::new(Box::new(FixedClassifier("calculate")))
            .with_retry(3, Duration::from_millis(250));
        assert_eq!(orchestrator.backoff(2), Duration::from_millis(500));

        let orchestrator = Orchestrator::new(Box::new(FixedClassifier("calculate")))
            .with_retry(3, Duration::MAX);
        assert_eq!(orchestrator.backoff(2), Duration::MAX);
    }
}
