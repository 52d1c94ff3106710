//! OpenAI-compatible chat-completions client.
//!
//! Talks to any server exposing `POST {base_url}/chat/completions`, with
//! server-sent events for streaming.
//!
//! # Example
//!
//! ```ignore
//! use chatscribe_models::providers::OpenAiClient;
//!
//! let client = OpenAiClient::new(std::env::var("OPENAI_API_KEY")?);
//! let local = OpenAiClient::with_base_url("http://localhost:11434/v1", "unused");
//! ```

use futures_util::StreamExt;
use futures_util::future::ready;
use futures_util::stream;

use super::{ChatRequest, ChatResponse, ChatStream, StreamChunk};
use crate::{Error, Result};

/// Default OpenAI API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Terminal payload of an OpenAI event stream.
const DONE_MARKER: &str = "[DONE]";

// ────────────────────────────────────────────────────────────────────────────
// Server-sent events
// ────────────────────────────────────────────────────────────────────────────

/// Incremental decoder for `text/event-stream` bodies.
///
/// Bytes may arrive split at arbitrary points; complete events are drained
/// as soon as their blank-line terminator has been seen.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    /// Feed bytes and drain every complete event as a parsed chunk.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Result<StreamChunk>> {
        // Carriage returns never occur inside a multi-byte UTF-8 sequence.
        self.buffer.extend(bytes.iter().copied().filter(|b| *b != b'\r'));
        let mut chunks = Vec::new();

        while let Some(split) = self.buffer.windows(2).position(|w| w == b"\n\n") {
            let frame: Vec<u8> = self.buffer.drain(..split + 2).collect();
            let Some(payload) = data_payload(&String::from_utf8_lossy(&frame)) else {
                continue;
            };
            if payload == DONE_MARKER {
                self.done = true;
                continue;
            }
            chunks.push(serde_json::from_str::<StreamChunk>(&payload).map_err(Error::from));
        }

        chunks
    }

    /// Whether the `[DONE]` marker has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }
}

fn data_payload(frame: &str) -> Option<String> {
    let lines: Vec<&str> = frame
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// OpenAiClient
// ────────────────────────────────────────────────────────────────────────────

/// OpenAI-compatible chat-completions client.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a client for the public OpenAI API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Create a client for a custom OpenAI-compatible endpoint.
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Get the base URL for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn post(&self, request: &ChatRequest) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ProviderApi(format!(
                "chat completions returned {}: {}",
                status, body
            )));
        }

        Ok(response)
    }

    /// Perform a chat completion request.
    pub async fn chat(&self, mut request: ChatRequest) -> Result<ChatResponse> {
        request.stream = false;
        let response = self.post(&request).await?;
        let body = response
            .text()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Perform a streaming chat completion request.
    pub async fn chat_stream(&self, mut request: ChatRequest) -> Result<ChatStream> {
        request.stream = true;
        let response = self.post(&request).await?;

        let chunks = response
            .bytes_stream()
            .scan(SseDecoder::default(), |decoder, result| {
                let batch = match result {
                    Ok(bytes) => decoder.feed(&bytes),
                    Err(e) => vec![Err(Error::Stream(e.to_string()))],
                };
                ready(Some(batch))
            })
            .flat_map(stream::iter);

        Ok(Box::pin(chunks))
    }
}

#[async_trait::async_trait]
impl super::ChatClient for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.chat(request).await
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<ChatStream> {
        self.chat_stream(request).await
    }
}
