//! Per-request routing state
//!
//! Tracks a request through RECEIVED → CLASSIFIED → ROUTED →
//! {TOOL_INVOKED | DIRECT_ANSWER} → RESPONDED. Nothing is kept across requests.

use std::fmt;

use serde::Serialize;

use crate::core::{ParleyError, Result};

/// Stage of a single request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestState {
    Received,
    Classified,
    Routed,
    ToolInvoked,
    DirectAnswer,
    Responded,
}

impl RequestState {
    /// Whether `next` may follow `self`
    pub fn can_advance_to(self, next: RequestState) -> bool {
        use RequestState::*;
        matches!(
            (self, next),
            (Received, Classified)
                | (Classified, Routed)
                | (Routed, ToolInvoked)
                | (Routed, DirectAnswer)
                | (ToolInvoked, Responded)
                | (DirectAnswer, Responded)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == RequestState::Responded
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RequestState::Received => "RECEIVED",
            RequestState::Classified => "CLASSIFIED",
            RequestState::Routed => "ROUTED",
            RequestState::ToolInvoked => "TOOL_INVOKED",
            RequestState::DirectAnswer => "DIRECT_ANSWER",
            RequestState::Responded => "RESPONDED",
        };
        f.write_str(label)
    }
}

/// States visited by one request, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestTrace {
    states: Vec<RequestState>,
}

impl RequestTrace {
    /// Start a trace in the RECEIVED state
    pub fn new() -> Self {
        Self {
            states: vec![RequestState::Received],
        }
    }

    pub fn current(&self) -> RequestState {
        self.states
            .last()
            .copied()
            .unwrap_or(RequestState::Received)
    }

    /// Move to `next`, rejecting transitions outside the state machine
    pub fn advance(&mut self, next: RequestState) -> Result<()> {
        let current = self.current();
        if !current.can_advance_to(next) {
            return Err(ParleyError::Other(format!(
                "invalid request transition {} -> {}",
                current, next
            )));
        }
        self.states.push(next);
        Ok(())
    }

    pub fn states(&self) -> &[RequestState] {
        &self.states
    }

    pub fn is_complete(&self) -> bool {
        self.current().is_terminal()
    }
}

impl Default for RequestTrace {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self
            .states
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" → ");
        f.write_str(&path)
    }
}
