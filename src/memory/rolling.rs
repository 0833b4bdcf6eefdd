//! Rolling conversation memory
//!
//! A bounded FIFO of turns. Turns pushed out of the buffer can optionally be
//! compacted into running summaries so older context survives in lossy form.

use std::collections::VecDeque;
use std::fmt;

use crate::core::{Role, Turn};
use crate::memory::summary::Summarizer;

/// Counters describing the memory's current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryStats {
    /// Turns currently buffered
    pub turns: usize,
    /// Maximum turns the buffer holds
    pub capacity: usize,
    /// Summaries stored
    pub summaries: usize,
    /// Turns evicted since the memory was created or cleared
    pub evicted: usize,
}

impl fmt::Display for MemoryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let usage = if self.capacity > 0 {
            100 * self.turns / self.capacity
        } else {
            0
        };
        writeln!(f, "Buffered:  {}/{} turns ({}%)", self.turns, self.capacity, usage)?;
        writeln!(f, "Summaries: {}", self.summaries)?;
        write!(f, "Evicted:   {}", self.evicted)
    }
}

/// Summarization state attached to a memory
struct Compaction {
    summarizer: Summarizer,
    /// Evicted turns needed before a summary is attempted
    trigger: usize,
    /// Evicted turns not yet folded into a summary
    pending: Vec<Turn>,
    /// Evictions since the last summary attempt
    since_last: usize,
}

/// Bounded buffer of the most recent turns
pub struct RollingMemory {
    turns: VecDeque<Turn>,
    max_turns: usize,
    summaries: Vec<String>,
    compaction: Option<Compaction>,
    evicted: usize,
}

impl RollingMemory {
    /// Create a memory keeping `max_turns` user/assistant exchanges
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(max_turns * 2),
            max_turns,
            summaries: Vec::new(),
            compaction: None,
            evicted: 0,
        }
    }

    /// Summarize evicted turns every `trigger` evictions
    pub fn with_summarizer(mut self, summarizer: Summarizer, trigger: usize) -> Self {
        self.compaction = Some(Compaction {
            summarizer,
            trigger: trigger.max(1),
            pending: Vec::new(),
            since_last: 0,
        });
        self
    }

    /// Maximum number of turns held (two per exchange)
    pub fn capacity(&self) -> usize {
        self.max_turns * 2
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    pub fn is_summarizing(&self) -> bool {
        self.compaction.is_some()
    }

    /// Append a turn, evicting the oldest turns once over capacity
    pub async fn add_turn(&mut self, role: Role, text: impl Into<String>) {
        self.turns.push_back(Turn::new(role, text));

        let mut evicted = Vec::new();
        while self.turns.len() > self.capacity() {
            if let Some(turn) = self.turns.pop_front() {
                evicted.push(turn);
            }
        }

        if evicted.is_empty() {
            return;
        }

        self.evicted += evicted.len();
        tracing::debug!(count = evicted.len(), total = self.evicted, "Evicted turns");

        if let Some(compaction) = self.compaction.as_mut() {
            compaction.since_last += evicted.len();
            compaction.pending.extend(evicted);
        }

        self.compact().await;
    }

    /// Append a user turn followed by the assistant's reply
    pub async fn add_exchange(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.add_turn(Role::User, user).await;
        self.add_turn(Role::Assistant, assistant).await;
    }

    /// Summarize pending evicted turns once the trigger is reached
    async fn compact(&mut self) {
        let Some(compaction) = self.compaction.as_mut() else {
            return;
        };

        if compaction.since_last < compaction.trigger {
            return;
        }
        compaction.since_last = 0;

        match compaction.summarizer.summarize(&compaction.pending).await {
            Ok(summary) => {
                tracing::info!(
                    turns = compaction.pending.len(),
                    "Compacted evicted turns into a summary"
                );
                compaction.pending.clear();
                self.summaries.push(summary);
            }
            Err(e) => {
                // Keep the block for the next trigger, bounded so a dead model
                // cannot grow it without limit.
                let keep = compaction.trigger * 2;
                let len = compaction.pending.len();
                if len > keep {
                    compaction.pending.drain(..len - keep);
                }
                tracing::warn!("Summarization skipped: {}", e);
            }
        }
    }

    /// Current turns, oldest first
    pub fn get(&self) -> &VecDeque<Turn> {
        &self.turns
    }

    /// Stored summaries, oldest first
    pub fn summaries(&self) -> &[String] {
        &self.summaries
    }

    /// Drop all turns, summaries and counters
    pub fn clear(&mut self) {
        self.turns.clear();
        self.summaries.clear();
        self.evicted = 0;
        if let Some(compaction) = self.compaction.as_mut() {
            compaction.pending.clear();
            compaction.since_last = 0;
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Render summaries then turns as prompt context
    pub fn render_context(&self) -> String {
        let mut context = String::new();

        for (i, summary) in self.summaries.iter().enumerate() {
            context.push_str(&format!("Earlier context ({}):\n{}\n\n", i + 1, summary));
        }

        for turn in &self.turns {
            context.push_str(&turn.transcript_line());
            context.push('\n');
        }

        context
    }

    pub fn stats(&self) -> MemoryStats {
        MemoryStats {
            turns: self.turns.len(),
            capacity: self.capacity(),
            summaries: self.summaries.len(),
            evicted: self.evicted,
        }
    }
}

impl Default for RollingMemory {
    fn default() -> Self {
        Self::new(5)
    }
}
