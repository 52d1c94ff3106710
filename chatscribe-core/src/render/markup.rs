//! Document-level markup: message containers, tool blocks, dividers.

use chatscribe_models::providers::{Role, Tool};
use serde_json::Value;

use super::text::escape_html;
use crate::tools::FormattedToolCall;

/// Container for one message, tagged with its role.
pub fn message(role: Role, body: &str) -> String {
    format!(r#"<div class="message {role}">{body}</div>"#)
}

/// Divider between conversations, labeled with the 1-based index.
pub fn divider(index: usize) -> String {
    format!(r#"<div class="divider">Step {index}</div>"#)
}

/// One tool-call block: name header plus indent-2 JSON arguments.
pub fn tool_call(call: &FormattedToolCall) -> String {
    format!(
        r#"<div class="tool-call-container"><div class="tool-call-header"><div class="tool-call-title">Tool | {}</div></div><pre><code class="language-json">{}</code></pre></div>"#,
        escape_html(&call.name),
        escape_html(&pretty_json(&call.arguments)),
    )
}

/// Hidden element carrying the tool definitions offered with a request.
pub fn tools_data(tools: &[Tool]) -> String {
    let json = serde_json::to_string_pretty(tools).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"<div class="tools-data" data-tools="{}" style="display:none;"></div>"#,
        escape_html(&json)
    )
}

/// Output captured from a shell-style tool call.
pub fn tool_output(output: &str) -> String {
    format!(r#"<div class="tool">{}</div>"#, escape_html(output))
}

/// Escaped JSON inside a code block, used when rendering fell back.
pub fn raw_json(json: &str) -> String {
    format!(
        r#"<pre><code class="language-json">{}</code></pre>"#,
        escape_html(json)
    )
}

/// Indent-2 JSON. Unparsed argument strings print as-is, without quotes.
pub fn pretty_json(value: &Value) -> String {
    match value {
        Value::String(raw) => raw.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}
