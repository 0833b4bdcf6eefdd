//! Agent module - intent routing and scoped agents
//!
//! Contains the intent classifier, the agents and their tool decision
//! strategies, and the orchestrator that ties them together.

#[allow(clippy::module_inception)]
pub mod agent;
pub mod classifier;
pub mod orchestrator;
pub mod presets;
pub mod prompts;
pub mod state;
pub mod strategy;

pub use agent::{Agent, AgentBuilder, AgentKind, AgentReply, ResponseMode, Resolution};
pub use classifier::{IntentClassifier, LlmIntentClassifier, ParsedIntent, OUT_OF_SCOPE};
pub use orchestrator::{AgentStatus, Orchestrator, OrchestratorStatus, RouteOutcome};
pub use state::{RequestState, RequestTrace};
pub use strategy::{DecisionStrategy, KeywordStrategy, LlmStrategy, ToolChoice};
