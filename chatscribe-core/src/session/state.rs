//! Conversation-tracking state

use serde::{Deserialize, Serialize};

/// Counters that decide where one conversation ends and the next begins
///
/// Only [`SessionTracker`](super::SessionTracker) mutates this.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Messages of the current conversation already rendered
    pub processed_count: usize,
    /// Largest batch seen in the current conversation
    pub previous_batch_size: usize,
    /// Boundaries detected after the first conversation
    pub conversation_index: usize,
    /// Whether any conversation has started yet
    pub has_seen_first_conversation: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }
}
