//! Tool decision strategies
//!
//! A strategy looks at a request and an agent's tools and decides which one
//! tool (if any) to call, and with what arguments.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::agent::prompts;
use crate::core::{Entities, Result};
use crate::llm::{GenerateOptions, TextGenerator};
use crate::tools::{Tool, ToolArgs, ToolRegistry};

/// A decision to call one tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolChoice {
    pub tool: String,
    pub args: ToolArgs,
}

/// Decides whether a tool applies to a request
#[async_trait]
pub trait DecisionStrategy: Send + Sync {
    /// Pick at most one tool for `request`
    async fn choose(
        &self,
        request: &str,
        entities: &Entities,
        tools: &ToolRegistry,
    ) -> Result<Option<ToolChoice>>;

    /// Strategy name for logs and status output
    fn name(&self) -> &str;
}

/// Fill a tool's parameters.
///
/// Each parameter takes, in order: an explicitly provided value, the entity of
/// the same name, and for single-parameter tools the lone provided value, the
/// lone entity, or the raw request.
pub fn fill_arguments(
    tool: &Tool,
    provided: &ToolArgs,
    entities: &Entities,
    request: &str,
) -> ToolArgs {
    let single = tool.parameters().len() == 1;
    let mut args = ToolArgs::new();

    for param in tool.parameters() {
        let value = provided
            .get(&param.name)
            .or_else(|| entities.get(&param.name))
            .cloned()
            .or_else(|| {
                if !single {
                    return None;
                }
                lone_value(provided)
                    .or_else(|| lone_value(entities))
                    .or_else(|| param.required.then(|| request.trim().to_string()))
            });

        if let Some(value) = value {
            args.insert(param.name.clone(), value);
        }
    }

    args
}

fn lone_value(map: &ToolArgs) -> Option<String> {
    let mut values = map.values().filter(|v| !v.trim().is_empty());
    match (values.next(), values.next()) {
        (Some(value), None) => Some(value.clone()),
        _ => None,
    }
}

/// Picks the first tool, in registration order, whose keywords occur in the request
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordStrategy;

impl KeywordStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous core of [`DecisionStrategy::choose`]
    pub fn select(&self, request: &str, entities: &Entities, tools: &ToolRegistry) -> Option<ToolChoice> {
        let tool = tools.iter().find(|tool| tool.matches(request))?;
        Some(ToolChoice {
            tool: tool.name().to_string(),
            args: fill_arguments(tool, &ToolArgs::new(), entities, request),
        })
    }
}

#[async_trait]
impl DecisionStrategy for KeywordStrategy {
    async fn choose(
        &self,
        request: &str,
        entities: &Entities,
        tools: &ToolRegistry,
    ) -> Result<Option<ToolChoice>> {
        let choice = self.select(request, entities, tools);
        tracing::debug!(strategy = "keyword", tool = ?choice.as_ref().map(|c| &c.tool), "Tool decision");
        Ok(choice)
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// Asks the model which tool to use
pub struct LlmStrategy {
    generator: Arc<dyn TextGenerator>,
    options: GenerateOptions,
}

impl LlmStrategy {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            options: GenerateOptions::new(150, 0.0).with_stop(Vec::new()),
        }
    }

    /// Interpret a tool selection reply. `None` for "none", unknown tools and
    /// anything that does not parse.
    pub fn parse_choice(
        reply: &str,
        request: &str,
        entities: &Entities,
        tools: &ToolRegistry,
    ) -> Option<ToolChoice> {
        let json = prompts::extract_json_object(reply)?;
        let value: Value = serde_json::from_str(&json).ok()?;

        let name = value
            .get("tool_name")
            .or_else(|| value.get("tool"))
            .and_then(Value::as_str)?
            .trim();

        if name.is_empty() || name.eq_ignore_ascii_case("none") {
            return None;
        }

        let Some(tool) = tools.lookup(name) else {
            tracing::warn!(tool = name, "Model selected an unknown tool");
            return None;
        };

        let provided = ["arguments", "parameters", "entities", "entieties", "entitites"]
            .iter()
            .find_map(|key| value.get(*key))
            .map(argument_map)
            .unwrap_or_default();

        Some(ToolChoice {
            tool: tool.name().to_string(),
            args: fill_arguments(tool, &provided, entities, request),
        })
    }
}

/// Flatten a JSON arguments object into strings, unwrapping `{"input": {...}}`
fn argument_map(value: &Value) -> ToolArgs {
    let object = match value.get("input") {
        Some(inner @ Value::Object(_)) => inner,
        _ => value,
    };

    match object {
        Value::Object(map) => map
            .iter()
            .filter_map(|(k, v)| stringify(v).map(|s| (k.clone(), s)))
            .collect(),
        Value::String(s) => ToolArgs::from([("input".to_string(), s.clone())]),
        _ => ToolArgs::new(),
    }
}

pub(crate) fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl DecisionStrategy for LlmStrategy {
    async fn choose(
        &self,
        request: &str,
        entities: &Entities,
        tools: &ToolRegistry,
    ) -> Result<Option<ToolChoice>> {
        if tools.is_empty() {
            return Ok(None);
        }

        let prompt = prompts::tool_selection_prompt(request, tools);
        let reply = self.generator.generate(&prompt, &self.options).await?;
        tracing::debug!(%reply, "Tool selection reply");

        let choice = Self::parse_choice(&reply, request, entities, tools);
        if choice.is_none() {
            tracing::debug!("Model chose no tool");
        }
        Ok(choice)
    }

    fn name(&self) -> &str {
        "llm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedGenerator;
    use crate::tools::{lookup, math};

    fn math_tools() -> ToolRegistry {
        ToolRegistry::with_tools([math::calculator(), math::advanced_math(), math::trigonometry()])
    }

    fn entities(pairs: &[(&str, &str)]) -> Entities {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_keyword_picks_first_match_in_registration_order() {
        // "2 ^ 3 + 1" matches both calculator and advanced_math
        let choice = KeywordStrategy
            .select("2 ^ 3 + 1", &Entities::new(), &math_tools())
            .unwrap();
        assert_eq!(choice.tool, "calculator");

        let choice = KeywordStrategy
            .select("what is the sine of 30", &Entities::new(), &math_tools())
            .unwrap();
        assert_eq!(choice.tool, "trigonometry");
    }

    #[test]
    fn test_keyword_no_match() {
        assert!(KeywordStrategy
            .select("tell me a joke", &Entities::new(), &math_tools())
            .is_none());
    }

    #[test]
    fn test_arguments_prefer_named_entity_then_raw_request() {
        let tool = math::calculator();
        let args = fill_arguments(&tool, &ToolArgs::new(), &entities(&[("expression", "5 + 3")]), "calc");
        assert_eq!(args["expression"], "5 + 3");

        let args = fill_arguments(&tool, &ToolArgs::new(), &entities(&[("math", "7 * 2")]), "calc");
        assert_eq!(args["expression"], "7 * 2");

        let args = fill_arguments(
            &tool,
            &ToolArgs::new(),
            &entities(&[("a", "1"), ("b", "2")]),
            " What is 5 + 3? ",
        );
        assert_eq!(args["expression"], "What is 5 + 3?");
    }

    #[test]
    fn test_parse_choice_variants() {
        let tools = ToolRegistry::with_tools([math::calculator(), lookup::weather()]);
        let none = Entities::new();

        let choice = LlmStrategy::parse_choice(
            r#"{"tool_name": "calculator", "arguments": {"expression": "5 + 3"}}"#,
            "5+3",
            &none,
            &tools,
        )
        .unwrap();
        assert_eq!(choice.args["expression"], "5 + 3");

        // nested "input" under a misspelled key
        let choice = LlmStrategy::parse_choice(
            r#"```json
{"tool_name": "weather", "entieties": {"input": {"location": "Paris"}}}
```"#,
            "weather?",
            &none,
            &tools,
        )
        .unwrap();
        assert_eq!(choice.tool, "weather");
        assert_eq!(choice.args["location"], "Paris");

        // bare "input" string for a single-parameter tool
        let choice = LlmStrategy::parse_choice(
            r#"{"tool_name": "calculator", "entities": {"input": "8 * 4"}}"#,
            "8*4",
            &none,
            &tools,
        )
        .unwrap();
        assert_eq!(choice.args["expression"], "8 * 4");
    }

    #[test]
    fn test_parse_choice_rejects_none_unknown_and_garbage() {
        let tools = math_tools();
        let none = Entities::new();
        assert!(LlmStrategy::parse_choice(r#"{"tool_name": "none"}"#, "hi", &none, &tools).is_none());
        assert!(LlmStrategy::parse_choice(r#"{"tool_name": "rocket"}"#, "hi", &none, &tools).is_none());
        assert!(LlmStrategy::parse_choice("I think calculator", "hi", &none, &tools).is_none());
    }

    #[tokio::test]
    async fn test_llm_strategy_propagates_generation_failure() {
        let generator = Arc::new(ScriptedGenerator::new().fail("model not loaded"));
        let strategy = LlmStrategy::new(generator);
        let result = strategy.choose("5+3", &Entities::new(), &math_tools()).await;
        assert!(result.unwrap_err().is_generation_failure());
    }

    #[tokio::test]
    async fn test_llm_strategy_skips_model_without_tools() {
        let generator = Arc::new(ScriptedGenerator::new());
        let strategy = LlmStrategy::new(generator.clone());
        let choice = strategy
            .choose("hello", &Entities::new(), &ToolRegistry::new())
            .await
            .unwrap();
        assert!(choice.is_none());
        assert_eq!(generator.calls(), 0);
    }
}
