//! Capturing decorator around a [`ChatClient`]
//!
//! [`Capture`] forwards every call to the wrapped client unchanged and
//! records the traffic on the side. Capture is fail-open: nothing that goes
//! wrong while recording changes what the caller gets back.
//!
//! Streaming responses are split with [`tee`]. The caller's copy is returned
//! immediately; a background task drains the other copy, aggregates it and
//! records the reply. That task is awaited before the next request is
//! recorded (bounded by the flush timeout) or by [`Capture::flush`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chatscribe_models::Result;
use chatscribe_models::providers::{ChatClient, ChatRequest, ChatResponse, ChatStream};
use chatscribe_models::stream::tee;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use crate::aggregator::StreamAggregator;
use crate::config::CaptureConfig;
use crate::document::{DocumentSink, DocumentStore, FileStore};
use crate::ingest::MessageIngestor;
use crate::types::AssistantMessage;

/// Shared handle to the recording state of one [`Capture`]
pub type CaptureSession = Arc<Mutex<MessageIngestor>>;

/// A [`ChatClient`] that records every exchange of the client it wraps
pub struct Capture<C> {
    inner: C,
    session: CaptureSession,
    pending: Mutex<Option<JoinHandle<()>>>,
    flush_timeout: Duration,
}

impl<C: ChatClient> Capture<C> {
    /// Wrap `inner`, writing documents to `store`
    pub fn new(inner: C, store: Arc<dyn DocumentStore>) -> Self {
        Self::with_ingestor(
            inner,
            MessageIngestor::new(DocumentSink::new(store)),
            Duration::from_millis(crate::config::DEFAULT_STREAM_FLUSH_TIMEOUT_MS),
        )
    }

    /// Wrap `inner`, writing files as configured
    pub fn with_config(inner: C, config: &CaptureConfig) -> Self {
        let store = Arc::new(FileStore::new(&config.output_dir));
        let sink = DocumentSink::new(store).with_title(&config.title);
        Self::with_ingestor(
            inner,
            MessageIngestor::new(sink),
            config.stream_flush_timeout(),
        )
    }

    pub fn with_ingestor(inner: C, ingestor: MessageIngestor, flush_timeout: Duration) -> Self {
        Self {
            inner,
            session: Arc::new(Mutex::new(ingestor)),
            pending: Mutex::new(None),
            flush_timeout,
        }
    }

    /// The wrapped client
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// The recording state shared with background stream tasks
    pub fn session(&self) -> CaptureSession {
        Arc::clone(&self.session)
    }

    /// Wait for any stream still being recorded, then close the open document
    ///
    /// Returns the id of the document closed by this call, if any.
    pub async fn flush(&self) -> Option<String> {
        let pending = self.pending.lock().await.take();
        if let Some(handle) = pending
            && let Err(e) = handle.await
        {
            warn!("Stream capture task failed: {}", e);
        }
        self.session.lock().await.close().await
    }

    /// Settle the previous turn, then record the request
    async fn begin_turn(&self, request: &ChatRequest) {
        self.settle_pending().await;

        let mut session = self.session.lock().await;
        if let Err(e) = session
            .ingest_request(&request.messages, &request.tools)
            .await
        {
            warn!("Failed to capture request: {}", e);
        }
    }

    /// Await the previous stream task up to the flush timeout. On timeout,
    /// stop it and write out what was captured so far.
    async fn settle_pending(&self) {
        let Some(mut handle) = self.pending.lock().await.take() else {
            return;
        };

        match tokio::time::timeout(self.flush_timeout, &mut handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Stream capture task failed: {}", e),
            Err(_) => {
                warn!(
                    "Stream capture still running after {:?}, flushing partial document",
                    self.flush_timeout
                );
                handle.abort();
                self.session.lock().await.close().await;
            }
        }
    }

    async fn record_response(&self, response: &ChatResponse) {
        let mut session = self.session.lock().await;
        let result = match AssistantMessage::from_response(response) {
            Some(message) => session.ingest_response(&message).await,
            None => {
                debug!("Response carried no choices");
                session.close().await;
                Ok(())
            }
        };
        if let Err(e) = result {
            warn!("Failed to capture response: {}", e);
        }
    }

    async fn record_error(&self, message: &str) {
        capture_error(&self.session, message).await;
    }
}

async fn capture_error(session: &CaptureSession, message: &str) {
    if let Err(e) = session.lock().await.ingest_error(message).await {
        warn!("Failed to capture error: {}", e);
    }
}

/// Drain one stream copy and record the aggregated reply
async fn aggregate(session: CaptureSession, mut stream: ChatStream) {
    let mut aggregator = StreamAggregator::new();

    while let Some(item) = stream.next().await {
        match item {
            Ok(chunk) => aggregator.push(&chunk),
            Err(e) => {
                capture_error(&session, &e.to_string()).await;
                return;
            }
        }
    }

    if let Some(message) = aggregator.finish()
        && let Err(e) = session.lock().await.ingest_response(&message).await
    {
        warn!("Failed to capture streamed response: {}", e);
    }
}

#[async_trait]
impl<C: ChatClient> ChatClient for Capture<C> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.begin_turn(&request).await;

        let result = self.inner.chat(request).await;
        match &result {
            Ok(response) => self.record_response(response).await,
            Err(e) => self.record_error(&e.to_string()).await,
        }
        result
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<ChatStream> {
        self.begin_turn(&request).await;

        let stream = match self.inner.chat_stream(request).await {
            Ok(stream) => stream,
            Err(e) => {
                self.record_error(&e.to_string()).await;
                return Err(e);
            }
        };

        let (primary, secondary) = tee(stream);
        let handle = tokio::spawn(aggregate(self.session(), secondary));
        *self.pending.lock().await = Some(handle);
        debug!("Capturing stream from {}", self.inner.name());

        Ok(primary)
    }
}

#[cfg(test)]
mod tests {
    use chatscribe_models::Error;
    use chatscribe_models::providers::{Message, MockClient, StreamChunk};

    use super::*;
    use crate::document::MemoryStore;

    fn capture() -> (Capture<MockClient>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Capture::new(MockClient::new(), store.clone()), store)
    }

    fn request(text: &str) -> ChatRequest {
        ChatRequest::new("test-model", vec![Message::user(text)])
    }

    #[tokio::test]
    async fn test_chat_returns_response_unchanged() {
        let (capture, store) = capture();
        let response = ChatResponse::text("hello back");
        capture.inner().queue_response(response.clone());

        let got = capture.chat(request("hello")).await.unwrap();

        assert_eq!(got, response);
        let (_, page) = store.documents().await.remove(0);
        assert!(page.contains("hello back"));
    }

    #[tokio::test]
    async fn test_upstream_error_is_recorded_and_returned() {
        let (capture, store) = capture();
        capture.inner().queue_error("quota exceeded");

        let err = capture.chat(request("hi")).await.unwrap_err();

        assert!(matches!(err, Error::ProviderApi(ref m) if m.contains("quota exceeded")));
        let (_, page) = store.documents().await.remove(0);
        assert!(page.contains("Error: "));
        assert!(page.contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_stream_is_recorded_after_flush() {
        let (capture, store) = capture();
        capture.inner().queue_stream(vec![
            StreamChunk::text("Hel"),
            StreamChunk::text("lo"),
            StreamChunk::finish("stop"),
        ]);

        let stream = capture.chat_stream(request("hi")).await.unwrap();
        let chunks: Vec<_> = stream.collect().await;
        assert_eq!(chunks.len(), 3);

        capture.flush().await;
        let (_, page) = store.documents().await.remove(0);
        assert!(page.contains("Hello"));
    }

    #[tokio::test]
    async fn test_create_dispatches_on_stream_flag() {
        let (capture, _) = capture();
        capture.inner().queue_stream(vec![StreamChunk::finish("stop")]);

        let completion = capture.create(request("hi").stream()).await.unwrap();
        assert!(matches!(
            completion,
            chatscribe_models::providers::Completion::Stream(_)
        ));
        assert!(capture.inner().requests()[0].streaming);
    }

    #[tokio::test]
    async fn test_flush_without_pending_work_is_noop() {
        let (capture, store) = capture();
        assert_eq!(capture.flush().await, None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_session_accessor_exposes_state() {
        let (capture, _) = capture();
        capture.inner().queue_response(ChatResponse::text("ok"));
        capture.chat(request("q")).await.unwrap();

        let state = capture.session().lock().await.state();
        assert_eq!(state.processed_count, 2);
        assert_eq!(state.conversation_index, 0);
    }
}
