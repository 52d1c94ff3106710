//! Scripted client for testing
//!
//! MockClient replays queued responses, streams, and errors in FIFO order,
//! enabling fast, deterministic tests of code that wraps a [`ChatClient`].

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ChatClient, ChatRequest, ChatResponse, ChatStream, StreamChunk};
use crate::{Error, Result};

/// One scripted outcome.
enum Scripted {
    Response(ChatResponse),
    Stream(Vec<Result<StreamChunk>>),
    Error(String),
}

/// A request the mock received, with the entry point it came through.
#[derive(Debug, Clone)]
pub struct Recorded {
    /// Whether the request came through `chat_stream`.
    pub streaming: bool,
    /// The request as received.
    pub request: ChatRequest,
}

/// Mock implementation of [`ChatClient`] for testing
///
/// Queue outcomes with `queue_*` before calling. Each call consumes one
/// queued outcome; a call with nothing queued fails with a provider error.
#[derive(Default)]
pub struct MockClient {
    outcomes: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<Recorded>>,
}

impl MockClient {
    /// Create a MockClient with nothing queued
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a non-streaming response
    pub fn queue_response(&self, response: ChatResponse) {
        self.push(Scripted::Response(response));
    }

    /// Queue a streaming response made of `chunks`
    pub fn queue_stream(&self, chunks: Vec<StreamChunk>) {
        self.push(Scripted::Stream(chunks.into_iter().map(Ok).collect()));
    }

    /// Queue a streaming response that yields `chunks` then fails
    pub fn queue_failing_stream(&self, chunks: Vec<StreamChunk>, message: &str) {
        let mut items: Vec<Result<StreamChunk>> = chunks.into_iter().map(Ok).collect();
        items.push(Err(Error::Stream(message.to_string())));
        self.push(Scripted::Stream(items));
    }

    /// Queue an error returned by the call itself
    pub fn queue_error(&self, message: &str) {
        self.push(Scripted::Error(message.to_string()));
    }

    /// Number of outcomes not yet consumed
    pub fn queued_count(&self) -> usize {
        self.outcomes.lock().map(|q| q.len()).unwrap_or(0)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn push(&self, outcome: Scripted) {
        if let Ok(mut queue) = self.outcomes.lock() {
            queue.push_back(outcome);
        }
    }

    fn next(&self, request: ChatRequest, streaming: bool) -> Result<Scripted> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(Recorded { streaming, request });
        }
        self.outcomes
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .ok_or_else(|| Error::ProviderApi("no queued outcome in MockClient".to_string()))
    }
}

#[async_trait]
impl ChatClient for MockClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        match self.next(request, false)? {
            Scripted::Response(response) => Ok(response),
            Scripted::Error(message) => Err(Error::ProviderApi(message)),
            Scripted::Stream(_) => Err(Error::ProviderApi(
                "MockClient queued a stream for a non-streaming call".to_string(),
            )),
        }
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<ChatStream> {
        match self.next(request, true)? {
            Scripted::Stream(items) => Ok(Box::pin(tokio_stream::iter(items))),
            Scripted::Error(message) => Err(Error::ProviderApi(message)),
            Scripted::Response(_) => Err(Error::ProviderApi(
                "MockClient queued a response for a streaming call".to_string(),
            )),
        }
    }
}
