//! Tool definition
//!
//! A tool is a named, pure function from string arguments to a string result,
//! plus the metadata agents need to pick it and fill its arguments.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::core::{ParleyError, Result};

/// Arguments passed to a tool, keyed by parameter name
pub type ToolArgs = BTreeMap<String, String>;

/// Tool callable. `Err(reason)` means the arguments were unusable.
pub type ToolHandler = Arc<dyn Fn(&ToolArgs) -> std::result::Result<String, String> + Send + Sync>;

/// A declared tool parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolParameter {
    pub name: String,
    pub description: String,
    pub required: bool,
}

/// A named capability with a declared argument contract
#[derive(Clone)]
pub struct Tool {
    name: String,
    description: String,
    parameters: Vec<ToolParameter>,
    keywords: Vec<String>,
    handler: ToolHandler,
}

impl Tool {
    /// Start building a tool
    pub fn builder(name: impl Into<String>, description: impl Into<String>) -> ToolBuilder {
        ToolBuilder {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
            keywords: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> &[ToolParameter] {
        &self.parameters
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Whether any of the tool's keywords occurs in `request`
    pub fn matches(&self, request: &str) -> bool {
        let request = request.to_lowercase();
        self.keywords
            .iter()
            .any(|keyword| contains_keyword(&request, keyword))
    }

    /// Validate `args` against the declared parameters, then run the handler
    pub fn invoke(&self, args: &ToolArgs) -> Result<String> {
        for param in self.parameters.iter().filter(|p| p.required) {
            match args.get(&param.name) {
                None => {
                    return Err(ParleyError::invalid_args(
                        &self.name,
                        format!("missing parameter '{}'", param.name),
                    ))
                }
                Some(value) if value.trim().is_empty() => {
                    return Err(ParleyError::invalid_args(
                        &self.name,
                        format!("parameter '{}' is empty", param.name),
                    ))
                }
                Some(_) => {}
            }
        }

        tracing::debug!(tool = %self.name, ?args, "Invoking tool");
        (self.handler)(args).map_err(|reason| ParleyError::invalid_args(&self.name, reason))
    }

    /// One-line summary used in prompts and listings
    pub fn signature(&self) -> String {
        let params = self
            .parameters
            .iter()
            .map(|p| {
                if p.required {
                    p.name.clone()
                } else {
                    format!("{}?", p.name)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({}): {}", self.name, params, self.description)
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("keywords", &self.keywords)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Tool`]
pub struct ToolBuilder {
    name: String,
    description: String,
    parameters: Vec<ToolParameter>,
    keywords: Vec<String>,
}

impl ToolBuilder {
    /// Declare a required parameter
    pub fn param(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.parameters.push(ToolParameter {
            name: name.into(),
            description: description.into(),
            required: true,
        });
        self
    }

    /// Declare an optional parameter
    pub fn optional_param(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.parameters.push(ToolParameter {
            name: name.into(),
            description: description.into(),
            required: false,
        });
        self
    }

    /// Trigger words used by keyword-based tool selection
    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords
            .extend(keywords.into_iter().map(|k| k.into().to_lowercase()));
        self
    }

    /// Attach the callable and finish
    pub fn handler<F>(self, handler: F) -> Tool
    where
        F: Fn(&ToolArgs) -> std::result::Result<String, String> + Send + Sync + 'static,
    {
        Tool {
            name: self.name,
            description: self.description,
            parameters: self.parameters,
            keywords: self.keywords,
            handler: Arc::new(handler),
        }
    }
}

/// Word keywords must match whole words; symbol keywords match anywhere.
pub(crate) fn contains_keyword(haystack: &str, keyword: &str) -> bool {
    if keyword.is_empty() {
        return false;
    }

    let wordlike = keyword.chars().all(|c| c.is_alphanumeric() || c == ' ');
    if !wordlike {
        return haystack.contains(keyword);
    }

    haystack.match_indices(keyword).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + keyword.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
