//! Bounded conversation context.
//!
//! Holds the prior turns of one chat session so they can be replayed in the
//! next completion request. The store is capped at a fixed number of turns;
//! when a new turn would exceed the cap, the oldest turn is evicted first.
//!
//! # Invariants
//!
//! - `len()` never exceeds `2 * capacity_turns()`
//! - entries always form whole user/assistant pairs, oldest first

use std::collections::VecDeque;

use super::message::Message;

/// Default number of turns (user/assistant pairs) kept in context.
pub const DEFAULT_CONTEXT_TURNS: usize = 8;

/// One user message plus the assistant reply to it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Turn {
    user: Message,
    assistant: Message,
}

/// Ordered, FIFO-capped sequence of conversation turns.
#[derive(Debug, Clone)]
pub struct ConversationContext {
    turns: VecDeque<Turn>,
    capacity_turns: usize,
}

impl ConversationContext {
    /// Creates an empty context holding at most `capacity_turns` pairs.
    pub fn new(capacity_turns: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(capacity_turns),
            capacity_turns,
        }
    }

    /// Appends a user/assistant pair, evicting the oldest pair if the cap
    /// would be exceeded.
    pub fn append(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        if self.capacity_turns == 0 {
            return;
        }

        while self.turns.len() >= self.capacity_turns {
            self.turns.pop_front();
        }

        self.turns.push_back(Turn {
            user: Message::user(user),
            assistant: Message::assistant(assistant),
        });
    }

    /// Returns the stored messages, oldest first.
    pub fn snapshot(&self) -> Vec<Message> {
        self.turns
            .iter()
            .flat_map(|turn| [turn.user.clone(), turn.assistant.clone()])
            .collect()
    }

    /// Number of stored messages (always even).
    pub fn len(&self) -> usize {
        self.turns.len() * 2
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of stored turns.
    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    pub fn capacity_turns(&self) -> usize {
        self.capacity_turns
    }
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_TURNS)
    }
}
