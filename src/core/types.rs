//! Shared types used across Parley modules
//!
//! Conversation turns, intent classifications and argument maps.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Entities extracted from a request, keyed by name
pub type Entities = BTreeMap<String, String>;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Upper-case label used when rendering transcripts
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Assistant => "ASSISTANT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One user or assistant message held in memory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    text: String,
}

impl Turn {
    /// Create a new turn
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    /// Create a user turn
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Create an assistant turn
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Render as a `ROLE: text` transcript line
    pub fn transcript_line(&self) -> String {
        format!("{}: {}", self.role.label(), self.text)
    }
}

/// Result of classifying a single request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentClassification {
    /// Intent label
    pub intent: String,
    /// Extracted entities
    #[serde(default)]
    pub entities: Entities,
    /// Confidence in [0, 1]
    pub confidence: f32,
    /// Why the classifier chose this label
    #[serde(default)]
    pub reasoning: String,
}

impl IntentClassification {
    /// Create a classification, clamping confidence into [0, 1]
    pub fn new(intent: impl Into<String>, entities: Entities, confidence: f32) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };

        Self {
            intent: intent.into(),
            entities,
            confidence,
            reasoning: String::new(),
        }
    }

    /// Attach the classifier's reasoning
    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    /// Fallback classification used when output could not be parsed
    pub fn fallback(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(label, Entities::new(), 0.0).with_reasoning(reason)
    }
}
