//! Request and response types for chat-completion clients.
//!
//! Field names follow the OpenAI chat-completions wire format so that
//! requests and responses round-trip through `serde_json` unchanged.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message setting context/behavior.
    System,
    /// User message.
    User,
    /// Assistant response.
    Assistant,
    /// Tool/function result.
    Tool,
}

impl Role {
    /// Lowercase wire name, also used as the markup class.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content of a message, either text or structured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    /// Simple text content.
    Text(String),
    /// Structured content parts (text, images, etc.).
    Parts(Vec<ContentPart>),
}

impl Content {
    /// Create text content.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Get content as text, joining text parts if necessary.
    pub fn as_text(&self) -> String {
        match self {
            Content::Text(s) => s.clone(),
            Content::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(""),
        }
    }

    /// True for empty text or an empty part list.
    pub fn is_empty(&self) -> bool {
        match self {
            Content::Text(s) => s.is_empty(),
            Content::Parts(parts) => parts.is_empty(),
        }
    }
}

impl Default for Content {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Vec<ContentPart>> for Content {
    fn from(parts: Vec<ContentPart>) -> Self {
        Self::Parts(parts)
    }
}

/// A part of structured content.
///
/// Images use the `image_url` wire shape; a flat `{"type":"image","url":..}`
/// is accepted on input as well. Parts with any other tag are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum ContentPart {
    /// Text content.
    Text { text: String },
    /// Image referenced by URL (http(s) or `data:` URI).
    Image { url: String, detail: Option<String> },
    /// A part with an unrecognized tag, kept as raw JSON.
    Other(Value),
}

impl ContentPart {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create an image part.
    pub fn image(url: impl Into<String>, detail: Option<String>) -> Self {
        Self::Image {
            url: url.into(),
            detail,
        }
    }

    /// The wire representation of this part.
    pub fn to_value(&self) -> Value {
        match self {
            ContentPart::Text { text } => json!({ "type": "text", "text": text }),
            ContentPart::Image { url, detail } => {
                let mut image_url = json!({ "url": url });
                if let Some(detail) = detail {
                    image_url["detail"] = json!(detail);
                }
                json!({ "type": "image_url", "image_url": image_url })
            }
            ContentPart::Other(raw) => raw.clone(),
        }
    }
}

impl TryFrom<Value> for ContentPart {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if !value.is_object() {
            return Err(format!("content part must be an object, got {value}"));
        }

        let tag = value.get("type").and_then(Value::as_str).unwrap_or("");
        let part = match tag {
            "text" => match value.get("text").and_then(Value::as_str) {
                Some(text) => ContentPart::text(text),
                None => ContentPart::Other(value),
            },
            "image_url" => {
                let image_url = value.get("image_url");
                let url = image_url
                    .and_then(|i| i.get("url").or(Some(i)))
                    .and_then(Value::as_str);
                let detail = image_url
                    .and_then(|i| i.get("detail"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                match url {
                    Some(url) => ContentPart::image(url, detail),
                    None => ContentPart::Other(value),
                }
            }
            "image" => {
                let url = value.get("url").and_then(Value::as_str);
                let detail = value
                    .get("detail")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                match url {
                    Some(url) => ContentPart::image(url, detail),
                    None => ContentPart::Other(value),
                }
            }
            _ => ContentPart::Other(value),
        };
        Ok(part)
    }
}

impl From<ContentPart> for Value {
    fn from(part: ContentPart) -> Self {
        match part {
            ContentPart::Other(raw) => raw,
            other => other.to_value(),
        }
    }
}

/// A message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender.
    pub role: Role,
    /// Content of the message. `null` on the wire becomes empty text.
    #[serde(default, deserialize_with = "nullable_content")]
    pub content: Content,
    /// Tool call ID if this is a tool result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Tool calls requested by an assistant message in the history.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

fn nullable_content<'de, D>(deserializer: D) -> Result<Content, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Content>::deserialize(deserializer)?.unwrap_or_default())
}

impl Message {
    fn with_role(role: Role, content: impl Into<Content>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_call_id: None,
            tool_calls: Vec::new(),
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<Content>) -> Self {
        Self::with_role(Role::System, content)
    }

    /// Create a user message.
    pub fn user(content: impl Into<Content>) -> Self {
        Self::with_role(Role::User, content)
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<Content>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    /// Create a tool result message.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<Content>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::with_role(Role::Tool, content)
        }
    }
}

/// Function name and (JSON-encoded) arguments of a tool call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Name of the function; absent in some malformed upstream payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Arguments as a JSON string.
    #[serde(default)]
    pub arguments: String,
}

/// A tool call made by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique ID for this tool call.
    #[serde(default)]
    pub id: String,
    /// Call type, `function` for every current API.
    #[serde(rename = "type", default = "default_tool_type")]
    pub kind: String,
    /// The function being invoked.
    #[serde(default)]
    pub function: FunctionCall,
}

fn default_tool_type() -> String {
    "function".to_string()
}

impl ToolCall {
    /// Create a function tool call.
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: default_tool_type(),
            function: FunctionCall {
                name: Some(name.into()),
                arguments: arguments.into(),
            },
        }
    }
}

/// Partial function fields carried by a streaming tool-call delta.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionDelta {
    /// Fragment of the function name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Fragment of the JSON arguments string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

/// A streaming fragment of a tool call, keyed by `index`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCallDelta {
    /// Stable position of the call within the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    /// Call ID, usually only on the first fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Call type, usually only on the first fragment.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Name/argument fragments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<FunctionDelta>,
}

/// Tool definition for function calling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Tool type, `function` for every current API.
    #[serde(rename = "type", default = "default_tool_type")]
    pub kind: String,
    /// Function definition.
    pub function: ToolFunction,
}

/// Function definition of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolFunction {
    /// Tool name.
    pub name: String,
    /// Tool description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON schema for parameters.
    #[serde(default)]
    pub parameters: Value,
}

impl Tool {
    /// Create a function tool definition.
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self {
            kind: default_tool_type(),
            function: ToolFunction {
                name: name.into(),
                description: Some(description.into()),
                parameters,
            },
        }
    }
}

/// Request for a chat completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model ID to use.
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<Message>,
    /// Sampling temperature (0.0 to 2.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Available tools for function calling.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    /// Whether to stream the response.
    #[serde(default)]
    pub stream: bool,
}

impl ChatRequest {
    /// Create a new chat request.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
            tools: Vec::new(),
            stream: false,
        }
    }

    /// Set the temperature.
    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Set the maximum tokens.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    /// Set available tools.
    pub fn tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = tools;
        self
    }

    /// Enable streaming.
    pub fn stream(mut self) -> Self {
        self.stream = true;
        self
    }
}

/// The message carried by a non-streaming choice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage {
    /// Role, `assistant` in practice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Text of the reply, `None` for pure tool-call replies.
    #[serde(default)]
    pub content: Option<String>,
    /// Tool calls requested by the model.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

/// One completion choice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Position of the choice.
    #[serde(default)]
    pub index: u32,
    /// The generated message.
    #[serde(default)]
    pub message: ResponseMessage,
    /// Why generation stopped (`stop`, `tool_calls`, `length`, ...).
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Response from a chat completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Response ID assigned by the API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Generated choices; capture only looks at the first.
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl ChatResponse {
    /// Build a single-choice text response.
    pub fn text(content: impl Into<String>) -> Self {
        Self::with_message(ResponseMessage {
            role: Some(Role::Assistant),
            content: Some(content.into()),
            tool_calls: Vec::new(),
        })
    }

    /// Build a single-choice response around `message`.
    pub fn with_message(message: ResponseMessage) -> Self {
        let finish_reason = if message.tool_calls.is_empty() {
            "stop"
        } else {
            "tool_calls"
        };
        Self {
            id: None,
            choices: vec![Choice {
                index: 0,
                message,
                finish_reason: Some(finish_reason.to_string()),
            }],
        }
    }

    /// The first choice's message, if any.
    pub fn first_message(&self) -> Option<&ResponseMessage> {
        self.choices.first().map(|choice| &choice.message)
    }
}

/// Incremental fields of a streaming choice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    /// Role, usually only on the first chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Text fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Tool-call fragments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallDelta>,
}

/// One choice of a streaming chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamChoice {
    /// Position of the choice.
    #[serde(default)]
    pub index: u32,
    /// The incremental fields.
    #[serde(default)]
    pub delta: Delta,
    /// Set on the terminal chunk.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// A chunk from a streaming response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Response ID assigned by the API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Choices carried by this chunk.
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

impl StreamChunk {
    /// A chunk carrying one text fragment.
    pub fn text(delta: impl Into<String>) -> Self {
        Self::with_delta(
            Delta {
                content: Some(delta.into()),
                ..Delta::default()
            },
            None,
        )
    }

    /// A chunk carrying tool-call fragments.
    pub fn tool_calls(deltas: Vec<ToolCallDelta>) -> Self {
        Self::with_delta(
            Delta {
                tool_calls: deltas,
                ..Delta::default()
            },
            None,
        )
    }

    /// An empty chunk carrying only a finish reason.
    pub fn finish(reason: impl Into<String>) -> Self {
        Self::with_delta(Delta::default(), Some(reason.into()))
    }

    /// A single-choice chunk.
    pub fn with_delta(delta: Delta, finish_reason: Option<String>) -> Self {
        Self {
            id: None,
            choices: vec![StreamChoice {
                index: 0,
                delta,
                finish_reason,
            }],
        }
    }
}
