//! Conversation boundary detection

use std::ops::Range;

use tracing::debug;

use super::state::SessionState;

/// Outcome of [`SessionTracker::begin_batch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// The very first conversation of the session
    First,
    /// A later conversation started; carries its divider number
    New(usize),
    /// The batch continues the current conversation
    Continuing,
}

impl Boundary {
    /// Index to label a divider with, when one should be emitted
    pub fn divider_index(&self) -> Option<usize> {
        match self {
            Boundary::New(index) => Some(*index),
            Boundary::First | Boundary::Continuing => None,
        }
    }
}

/// Applies the boundary heuristic to incoming request batches
///
/// A caller that resends its whole history each turn grows the batch by at
/// least one message per turn. A batch that did not grow starts a new
/// conversation.
#[derive(Debug, Default)]
pub struct SessionTracker {
    state: SessionState,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state snapshot
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a batch of `batch_size` messages starts a new conversation
    pub fn is_new_conversation(&self, batch_size: usize) -> bool {
        self.state.previous_batch_size == 0 || batch_size < self.state.previous_batch_size + 1
    }

    /// Classify a batch and update the counters accordingly
    pub fn begin_batch(&mut self, batch_size: usize) -> Boundary {
        if !self.is_new_conversation(batch_size) {
            self.state.previous_batch_size = self.state.previous_batch_size.max(batch_size);
            return Boundary::Continuing;
        }

        let boundary = if self.state.has_seen_first_conversation {
            self.state.conversation_index += 1;
            self.state.processed_count = 0;
            Boundary::New(self.state.conversation_index)
        } else {
            Boundary::First
        };

        self.state.previous_batch_size = batch_size;
        self.state.has_seen_first_conversation = true;

        debug!(
            "Conversation boundary {:?} at batch size {}",
            boundary, batch_size
        );
        boundary
    }

    /// Indices of the batch not yet rendered
    pub fn pending(&self, batch_size: usize) -> Range<usize> {
        self.state.processed_count.min(batch_size)..batch_size
    }

    /// Mark one more message as rendered
    pub fn advance(&mut self) {
        self.state.processed_count += 1;
    }
}
