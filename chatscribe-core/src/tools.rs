//! Tool-call formatting.

use chatscribe_models::providers::ToolCall;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name used when a tool call arrives without one.
pub const UNKNOWN_TOOL: &str = "unknown";

/// A tool call ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedToolCall {
    /// Function name, [`UNKNOWN_TOOL`] when missing.
    pub name: String,
    /// Parsed JSON arguments, or the raw string when they don't parse.
    pub arguments: Value,
}

impl FormattedToolCall {
    /// Format one raw call. Never fails.
    pub fn from_raw(call: &ToolCall) -> Self {
        let name = call
            .function
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_TOOL)
            .to_string();

        Self {
            name,
            arguments: parse_arguments(&call.function.arguments),
        }
    }

    /// String field `key` of the arguments, if they are an object.
    pub fn string_argument(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(Value::as_str)
    }
}

/// Format a batch of raw calls; one malformed call never affects the others.
pub fn format_tool_calls(calls: &[ToolCall]) -> Vec<FormattedToolCall> {
    calls.iter().map(FormattedToolCall::from_raw).collect()
}

fn parse_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
