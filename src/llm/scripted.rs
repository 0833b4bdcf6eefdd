//! Scripted text generator
//!
//! Replays queued replies in order and records every prompt it was given.
//! Used to drive memory, classifier and agent flows without a model server.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::{ParleyError, Result};
use crate::llm::traits::{GenerateOptions, TextGenerator};

/// One scripted outcome
#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Failure(String),
}

/// Deterministic generator backed by a reply queue
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<String>>,
    fallback: Option<String>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply returned once the queue is empty; without one an empty queue fails
    pub fn with_fallback(reply: impl Into<String>) -> Self {
        Self {
            fallback: Some(reply.into()),
            ..Self::default()
        }
    }

    /// Queue a successful reply
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.lock_replies().push_back(Reply::Text(text.into()));
        self
    }

    /// Queue a generation failure
    pub fn fail(self, reason: impl Into<String>) -> Self {
        self.lock_replies().push_back(Reply::Failure(reason.into()));
        self
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    /// Number of generate calls made
    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Replies still queued
    pub fn remaining(&self) -> usize {
        self.lock_replies().len()
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<Reply>> {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, _options: &GenerateOptions) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let next = self.lock_replies().pop_front();
        match next {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Failure(reason)) => Err(ParleyError::generation(reason)),
            None => self
                .fallback
                .clone()
                .ok_or_else(|| ParleyError::generation("scripted generator exhausted")),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
