//! Scoped agents
//!
//! An agent handles one intent. Specialists may call one of their tools per
//! request; the fallback agent only ever lists what the others can do.

use std::fmt;
use std::sync::Arc;

use crate::agent::prompts;
use crate::agent::strategy::{DecisionStrategy, KeywordStrategy};
use crate::core::{Entities, ParleyError, Result};
use crate::llm::{GenerateOptions, TextGenerator};
use crate::tools::{Tool, ToolRegistry};

/// How a tool result becomes the final reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseMode {
    /// Return the tool output as-is
    Verbatim,
    /// Have the model phrase an answer from the tool output
    #[default]
    Narrated,
}

/// Role of an agent within the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Specialist,
    Fallback,
}

/// How a request was resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A tool produced the answer
    ToolInvoked { tool: String },
    /// The agent answered without tools
    DirectAnswer,
    /// The fallback agent declined and listed capabilities
    Declined,
}

impl Resolution {
    pub fn used_tool(&self) -> Option<&str> {
        match self {
            Resolution::ToolInvoked { tool } => Some(tool),
            _ => None,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::ToolInvoked { tool } => write!(f, "tool:{}", tool),
            Resolution::DirectAnswer => write!(f, "direct"),
            Resolution::Declined => write!(f, "declined"),
        }
    }
}

/// An agent's answer to one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReply {
    /// Name of the agent that answered
    pub agent: String,
    pub text: String,
    pub resolution: Resolution,
}

/// A scoped request handler
pub struct Agent {
    name: String,
    description: String,
    persona: String,
    kind: AgentKind,
    tools: ToolRegistry,
    strategy: Box<dyn DecisionStrategy>,
    response_mode: ResponseMode,
    generator: Option<Arc<dyn TextGenerator>>,
    options: GenerateOptions,
    /// (intent label, description) of the other agents; fallback only
    capabilities: Vec<(String, String)>,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("tools", &self.tools.names())
            .field("strategy", &self.strategy.name())
            .field("response_mode", &self.response_mode)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Agent`]
pub struct AgentBuilder {
    name: String,
    description: Option<String>,
    persona: Option<String>,
    kind: AgentKind,
    tools: ToolRegistry,
    strategy: Option<Box<dyn DecisionStrategy>>,
    response_mode: ResponseMode,
    generator: Option<Arc<dyn TextGenerator>>,
    options: GenerateOptions,
}

impl AgentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            persona: None,
            kind: AgentKind::Specialist,
            tools: ToolRegistry::new(),
            strategy: None,
            response_mode: ResponseMode::default(),
            generator: None,
            options: GenerateOptions::new(150, 0.7),
        }
    }

    /// What the agent handles; also used as the intent description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// System prompt for direct answers
    pub fn persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = Some(persona.into());
        self
    }

    /// Add a tool; registration order is priority order
    pub fn tool(mut self, tool: Tool) -> Self {
        self.tools.register(tool);
        self
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn strategy(mut self, strategy: Box<dyn DecisionStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn response_mode(mut self, mode: ResponseMode) -> Self {
        self.response_mode = mode;
        self
    }

    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Options for direct answers and narration
    pub fn options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    /// Make this the fallback agent
    pub fn fallback(mut self) -> Self {
        self.kind = AgentKind::Fallback;
        self
    }

    /// Build the agent.
    ///
    /// Specialists need a generator for direct answers; the fallback agent
    /// may not carry tools.
    pub fn build(self) -> Result<Agent> {
        match self.kind {
            AgentKind::Fallback if !self.tools.is_empty() => {
                return Err(ParleyError::config(format!(
                    "fallback agent '{}' cannot have tools",
                    self.name
                )));
            }
            AgentKind::Specialist if self.generator.is_none() => {
                return Err(ParleyError::config(format!(
                    "agent '{}' needs a text generator",
                    self.name
                )));
            }
            _ => {}
        }

        let description = self
            .description
            .unwrap_or_else(|| format!("Requests handled by {}", self.name));

        Ok(Agent {
            persona: self
                .persona
                .unwrap_or_else(|| format!("You are {}, a helpful assistant.", self.name)),
            name: self.name,
            description,
            kind: self.kind,
            tools: self.tools,
            strategy: self.strategy.unwrap_or_else(|| Box::new(KeywordStrategy)),
            response_mode: self.response_mode,
            generator: self.generator,
            options: self.options,
            capabilities: Vec::new(),
        })
    }
}

impl Agent {
    pub fn builder(name: impl Into<String>) -> AgentBuilder {
        AgentBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn is_fallback(&self) -> bool {
        self.kind == AgentKind::Fallback
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    pub fn response_mode(&self) -> ResponseMode {
        self.response_mode
    }

    /// Set the capability list the fallback agent reports
    pub fn set_capabilities(&mut self, capabilities: Vec<(String, String)>) {
        self.capabilities = capabilities;
    }

    /// Handle one request.
    ///
    /// At most one tool is invoked. Unusable tool arguments degrade to a direct
    /// answer; generation failures are returned to the caller.
    pub async fn handle(&self, request: &str, entities: &Entities) -> Result<AgentReply> {
        if self.is_fallback() {
            return Ok(self.reply(
                prompts::capability_message(&self.capabilities),
                Resolution::Declined,
            ));
        }

        if let Some(choice) = self.strategy.choose(request, entities, &self.tools).await? {
            match self.tools.lookup(&choice.tool).map(|tool| tool.invoke(&choice.args)) {
                Some(Ok(output)) => {
                    tracing::info!(agent = %self.name, tool = %choice.tool, "Tool invoked");
                    let text = self.finish_with_tool_output(request, &output).await?;
                    return Ok(self.reply(text, Resolution::ToolInvoked { tool: choice.tool }));
                }
                Some(Err(e)) => {
                    tracing::warn!(agent = %self.name, "{}; answering directly", e);
                }
                None => {
                    tracing::warn!(agent = %self.name, tool = %choice.tool, "Chosen tool is not registered");
                }
            }
        }

        let text = self.direct_answer(request).await?;
        Ok(self.reply(text, Resolution::DirectAnswer))
    }

    async fn finish_with_tool_output(&self, request: &str, output: &str) -> Result<String> {
        match (self.response_mode, &self.generator) {
            (ResponseMode::Narrated, Some(generator)) => {
                let prompt = prompts::tool_response_prompt(request, output);
                let narrated = generator.generate(&prompt, &self.options).await?;
                if narrated.trim().is_empty() {
                    Ok(output.to_string())
                } else {
                    Ok(narrated.trim().to_string())
                }
            }
            _ => Ok(output.to_string()),
        }
    }

    async fn direct_answer(&self, request: &str) -> Result<String> {
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| ParleyError::config(format!("agent '{}' has no generator", self.name)))?;

        let prompt = prompts::persona_prompt(&self.persona, request);
        let answer = generator.generate(&prompt, &self.options).await?;
        Ok(answer.trim().to_string())
    }

    fn reply(&self, text: String, resolution: Resolution) -> AgentReply {
        AgentReply {
            agent: self.name.clone(),
            text,
            resolution,
        }
    }
}
