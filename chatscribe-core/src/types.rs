//! Captured message types

use chatscribe_models::providers::{ChatResponse, ResponseMessage};
use serde::{Deserialize, Serialize};

use crate::tools::{FormattedToolCall, format_tool_calls};

/// A complete assistant reply, from a response or an aggregated stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub text: String,
    pub tool_calls: Vec<FormattedToolCall>,
}

impl AssistantMessage {
    /// The reply carried by the first choice, if any
    pub fn from_response(response: &ChatResponse) -> Option<Self> {
        response.first_message().map(Self::from)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.tool_calls.is_empty()
    }
}

impl From<&ResponseMessage> for AssistantMessage {
    fn from(message: &ResponseMessage) -> Self {
        Self {
            text: message.content.clone().unwrap_or_default(),
            tool_calls: format_tool_calls(&message.tool_calls),
        }
    }
}

#[cfg(test)]
mod tests {
    use chatscribe_models::providers::{Role, ToolCall};
    use serde_json::json;

    use super::*;

    #[test]
    fn from_response_uses_first_choice() {
        let response = ChatResponse::text("hi");
        let message = AssistantMessage::from_response(&response).unwrap();
        assert_eq!(message.text, "hi");
        assert!(message.tool_calls.is_empty());
    }

    #[test]
    fn from_response_without_choices_is_none() {
        assert!(AssistantMessage::from_response(&ChatResponse::default()).is_none());
    }

    #[test]
    fn null_content_with_tool_calls() {
        let response = ChatResponse::with_message(ResponseMessage {
            role: Some(Role::Assistant),
            content: None,
            tool_calls: vec![ToolCall::function("c1", "ls", r#"{"path":"."}"#)],
        });
        let message = AssistantMessage::from_response(&response).unwrap();
        assert_eq!(message.text, "");
        assert_eq!(message.tool_calls[0].arguments, json!({"path": "."}));
        assert!(!message.is_empty());
    }
}
