//! Message aggregation from streaming chunks

use std::collections::BTreeMap;

use chatscribe_models::providers::{FunctionCall, StreamChunk, ToolCall, ToolCallDelta};

use crate::tools::format_tool_calls;
use crate::types::AssistantMessage;

/// Lifecycle of a [`StreamAggregator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorState {
    /// Still consuming chunks
    Accumulating,
    /// The message has been handed out; further chunks are ignored
    Finalized,
}

/// Aggregates streaming chunks into one complete assistant message
pub struct StreamAggregator {
    /// Accumulated text
    text: String,
    /// Tool calls being built, keyed by stream index
    pending: BTreeMap<u32, ToolBuilder>,
    /// Named calls flushed by a finish reason
    completed: Vec<ToolCall>,
    state: AggregatorState,
}

#[derive(Default)]
struct ToolBuilder {
    id: String,
    kind: String,
    name: String,
    arguments: String,
}

impl ToolBuilder {
    fn apply(&mut self, delta: &ToolCallDelta) {
        if self.id.is_empty()
            && let Some(id) = &delta.id
        {
            self.id = id.clone();
        }
        if self.kind.is_empty()
            && let Some(kind) = &delta.kind
        {
            self.kind = kind.clone();
        }
        if let Some(function) = &delta.function {
            if let Some(name) = &function.name {
                self.name.push_str(name);
            }
            if let Some(arguments) = &function.arguments {
                self.arguments.push_str(arguments);
            }
        }
    }

    fn build(self) -> ToolCall {
        ToolCall {
            id: self.id,
            kind: if self.kind.is_empty() {
                "function".to_string()
            } else {
                self.kind
            },
            function: FunctionCall {
                name: Some(self.name),
                arguments: self.arguments,
            },
        }
    }
}

impl StreamAggregator {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            pending: BTreeMap::new(),
            completed: Vec::new(),
            state: AggregatorState::Accumulating,
        }
    }

    /// Current state
    pub fn state(&self) -> AggregatorState {
        self.state
    }

    /// Text accumulated so far
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Process one chunk; only the first choice is considered
    pub fn push(&mut self, chunk: &StreamChunk) {
        if self.state == AggregatorState::Finalized {
            return;
        }
        let Some(choice) = chunk.choices.first() else {
            return;
        };

        if let Some(content) = &choice.delta.content {
            self.text.push_str(content);
        }

        for delta in &choice.delta.tool_calls {
            self.pending
                .entry(delta.index.unwrap_or(0))
                .or_default()
                .apply(delta);
        }

        if choice.finish_reason.is_some() {
            self.flush_pending();
        }
    }

    /// Hand out the aggregated message. Returns `None` once finalized.
    pub fn finish(&mut self) -> Option<AssistantMessage> {
        if self.state == AggregatorState::Finalized {
            return None;
        }
        self.state = AggregatorState::Finalized;
        self.pending.clear();

        Some(AssistantMessage {
            text: std::mem::take(&mut self.text),
            tool_calls: format_tool_calls(&std::mem::take(&mut self.completed)),
        })
    }

    /// Move every named pending call to the completed list, in index order.
    /// Calls that never received a name are dropped.
    fn flush_pending(&mut self) {
        for (_, builder) in std::mem::take(&mut self.pending) {
            if !builder.name.is_empty() {
                self.completed.push(builder.build());
            }
        }
    }
}

impl Default for StreamAggregator {
    fn default() -> Self {
        Self::new()
    }
}
