//! Chat client trait and implementations.
//!
//! The [`ChatClient`] trait is the call interface that capture wraps. Any
//! client that speaks the chat-completions shape implements it: the HTTP
//! [`OpenAiClient`], the scripted [`MockClient`], or a decorator around
//! another client.
//!
//! # Example
//!
//! ```ignore
//! use chatscribe_models::providers::{ChatClient, ChatRequest, Message};
//!
//! async fn chat(client: &dyn ChatClient) {
//!     let request = ChatRequest::new("gpt-4o-mini", vec![Message::user("Hello!")]);
//!     let response = client.chat(request).await?;
//!     println!("{:?}", response.first_message());
//! }
//! ```

mod mock;
mod openai;
mod types;

use std::pin::Pin;

use async_trait::async_trait;
use tokio_stream::Stream;

pub use mock::{MockClient, Recorded};
pub use openai::{DEFAULT_BASE_URL, OpenAiClient, SseDecoder};
pub use types::*;

use crate::Result;

/// A stream of chat response chunks for streaming responses.
///
/// This is a pinned, boxed stream that yields [`StreamChunk`] items or errors.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>>;

/// Result of [`ChatClient::create`]: a full response or a chunk stream,
/// depending on [`ChatRequest::stream`].
pub enum Completion {
    /// Non-streaming response.
    Response(ChatResponse),
    /// Streaming response.
    Stream(ChatStream),
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Completion::Response(response) => f.debug_tuple("Response").field(response).finish(),
            Completion::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Trait for chat-completion clients.
///
/// # Required Methods
///
/// - [`name`](ChatClient::name) - Client identifier (e.g., "openai", "mock")
/// - [`chat`](ChatClient::chat) - Non-streaming chat completion
/// - [`chat_stream`](ChatClient::chat_stream) - Streaming chat completion
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Returns the client name.
    fn name(&self) -> &str;

    /// Perform a chat completion request.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Perform a streaming chat completion request.
    ///
    /// The stream ends after the chunk carrying a `finish_reason`.
    async fn chat_stream(&self, request: ChatRequest) -> Result<ChatStream>;

    /// Dispatch on `request.stream`, mirroring the single
    /// `chat.completions.create` entry point of the HTTP API.
    async fn create(&self, request: ChatRequest) -> Result<Completion> {
        if request.stream {
            self.chat_stream(request).await.map(Completion::Stream)
        } else {
            self.chat(request).await.map(Completion::Response)
        }
    }
}

#[async_trait]
impl<T: ChatClient + ?Sized> ChatClient for std::sync::Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        (**self).chat(request).await
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<ChatStream> {
        (**self).chat_stream(request).await
    }
}
