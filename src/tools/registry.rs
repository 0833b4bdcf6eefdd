//! Tool registry - ordered collection of tools
//!
//! Registration order is the priority order used when several tools could
//! apply to one request.

use std::collections::HashMap;

use crate::tools::tool::Tool;

/// Registry of available tools
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    /// Tools in registration order
    tools: Vec<Tool>,
    /// Position of each tool in `tools`, by name
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from tools in priority order
    pub fn with_tools(tools: impl IntoIterator<Item = Tool>) -> Self {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool);
        }
        registry
    }

    /// Register a tool.
    ///
    /// A tool with an existing name replaces the old one in its original
    /// priority slot; the replaced tool is returned.
    pub fn register(&mut self, tool: Tool) -> Option<Tool> {
        if let Some(&slot) = self.index.get(tool.name()) {
            tracing::warn!(tool = tool.name(), "Replacing already registered tool");
            return Some(std::mem::replace(&mut self.tools[slot], tool));
        }

        tracing::debug!(tool = tool.name(), "Registered tool");
        self.index.insert(tool.name().to_string(), self.tools.len());
        self.tools.push(tool);
        None
    }

    /// Look up a tool by name
    pub fn lookup(&self, name: &str) -> Option<&Tool> {
        self.index.get(name).map(|&slot| &self.tools[slot])
    }

    /// Tool names in priority order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(Tool::name).collect()
    }

    /// Iterate tools in priority order
    pub fn iter(&self) -> impl Iterator<Item = &Tool> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Bullet list of tool signatures for prompts
    pub fn describe(&self) -> String {
        self.tools
            .iter()
            .map(|tool| format!("- {}", tool.signature()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::tool::ToolArgs;

    fn constant(name: &str, output: &'static str) -> Tool {
        Tool::builder(name, format!("Returns {}", output)).handler(move |_| Ok(output.to_string()))
    }

    #[test]
    fn test_lookup_and_order() {
        let registry = ToolRegistry::with_tools([constant("a", "1"), constant("b", "2")]);
        assert_eq!(registry.names(), vec!["a", "b"]);
        assert!(registry.lookup("b").is_some());
        assert!(registry.lookup("c").is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_name_overwrites_in_place() {
        let mut registry = ToolRegistry::with_tools([constant("a", "1"), constant("b", "2")]);
        let replaced = registry.register(constant("a", "3"));

        assert!(replaced.is_some());
        assert_eq!(registry.names(), vec!["a", "b"]);
        let out = registry.lookup("a").unwrap().invoke(&ToolArgs::new()).unwrap();
        assert_eq!(out, "3");
    }

    #[test]
    fn test_describe_lists_signatures() {
        let registry = ToolRegistry::with_tools([constant("a", "1")]);
        assert_eq!(registry.describe(), "- a(): Returns 1");
        assert!(ToolRegistry::new().is_empty());
    }
}
