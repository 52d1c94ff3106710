//! End-to-end tests for the capture pipeline
//!
//! These drive [`Capture`] through scripted clients and check what lands in
//! the document store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chatscribe_core::document::template::DEFAULT_TITLE;
use chatscribe_core::render::markup;
use chatscribe_core::{
    Capture, CaptureConfig, DocumentSink, HtmlRenderer, MemoryStore, MessageIngestor, Render,
    RenderError,
};
use chatscribe_models::providers::{
    ChatClient, ChatRequest, ChatResponse, ChatStream, Content, FunctionDelta, Message,
    MockClient, Role, StreamChunk, ToolCallDelta,
};
use chatscribe_models::{Error, Result};
use tempfile::TempDir;
use tokio_stream::StreamExt;

/// Renderer that rejects any content mentioning "poison"
struct PickyRenderer;

impl Render for PickyRenderer {
    fn render(&self, content: &Content) -> std::result::Result<String, RenderError> {
        if content.as_text().contains("poison") {
            return Err(RenderError::InvalidContent("poisoned".to_string()));
        }
        HtmlRenderer.render(content)
    }
}

/// Client whose stream yields a few chunks and then stalls forever
struct StalledClient {
    chunks: Vec<StreamChunk>,
}

#[async_trait]
impl ChatClient for StalledClient {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse> {
        Ok(ChatResponse::text("unused"))
    }

    async fn chat_stream(&self, _request: ChatRequest) -> Result<ChatStream> {
        let head = tokio_stream::iter(self.chunks.clone().into_iter().map(Ok));
        Ok(Box::pin(head.chain(tokio_stream::pending())))
    }
}

fn mock_capture() -> (Capture<MockClient>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (Capture::new(MockClient::new(), store.clone()), store)
}

fn tool_delta(index: u32, name: Option<&str>, arguments: &str) -> ToolCallDelta {
    ToolCallDelta {
        index: Some(index),
        id: Some(format!("call_{}", index)),
        kind: Some("function".to_string()),
        function: Some(FunctionDelta {
            name: name.map(str::to_string),
            arguments: Some(arguments.to_string()),
        }),
    }
}

#[tokio::test]
async fn failing_message_does_not_stop_the_batch() {
    let store = Arc::new(MemoryStore::new());
    let mut ingestor = MessageIngestor::with_renderer(
        DocumentSink::new(store.clone()),
        Arc::new(PickyRenderer),
    );
    let poisoned = Message::user("poison pill");
    let batch = vec![Message::user("alpha"), poisoned.clone(), Message::user("gamma")];

    ingestor.ingest_request(&batch, &[]).await.unwrap();

    let fragments = ingestor.sink().current().unwrap().fragments().to_vec();
    assert_eq!(fragments.len(), 3);
    assert!(fragments[0].contains("alpha"));
    let json = serde_json::to_string(&poisoned).unwrap();
    assert_eq!(
        fragments[1],
        markup::message(Role::User, &markup::raw_json(&json))
    );
    assert!(fragments[2].contains("gamma"));
}

#[tokio::test]
async fn failing_message_keeps_capture_order() {
    let store = Arc::new(MemoryStore::new());
    let ingestor = MessageIngestor::with_renderer(
        DocumentSink::new(store.clone()),
        Arc::new(PickyRenderer),
    );
    let capture = Capture::with_ingestor(MockClient::new(), ingestor, Duration::from_secs(1));
    capture.inner().queue_response(ChatResponse::text("final answer"));

    let request = ChatRequest::new(
        "m",
        vec![
            Message::user("alpha"),
            Message::user("poison pill"),
            Message::user("gamma"),
        ],
    );
    capture.chat(request).await.unwrap();

    let (_, page) = store.documents().await.remove(0);
    let alpha = page.find("alpha").unwrap();
    let fallback = page.find("poison pill").unwrap();
    let gamma = page.find("gamma").unwrap();
    let reply = page.find("final answer").unwrap();
    assert!(alpha < fallback && fallback < gamma && gamma < reply);
}

#[tokio::test]
async fn multi_turn_conversation_renders_each_message_once() {
    let (capture, store) = mock_capture();
    capture.inner().queue_response(ChatResponse::text("first reply"));
    capture.inner().queue_response(ChatResponse::text("second reply"));

    let mut messages = vec![Message::user("first question")];
    capture
        .chat(ChatRequest::new("m", messages.clone()))
        .await
        .unwrap();

    messages.push(Message::assistant("first reply"));
    messages.push(Message::user("second question"));
    capture.chat(ChatRequest::new("m", messages)).await.unwrap();

    let documents = store.documents().await;
    assert_eq!(documents.len(), 2);
    let second = &documents[1].1;
    assert!(!second.contains("first question"));
    assert!(!second.contains("first reply"));
    assert!(second.contains("second question"));
    assert!(second.contains("second reply"));
}

#[tokio::test]
async fn restarted_conversation_gets_divider() {
    let (capture, store) = mock_capture();
    capture.inner().queue_response(ChatResponse::text("a"));
    capture.inner().queue_response(ChatResponse::text("b"));

    let batch = vec![Message::system("sys"), Message::user("q")];
    capture
        .chat(ChatRequest::new("m", batch.clone()))
        .await
        .unwrap();
    capture.chat(ChatRequest::new("m", batch)).await.unwrap();

    let documents = store.documents().await;
    assert!(!documents[0].1.contains("class=\"divider\""));
    assert!(documents[1].1.contains(r#"<div class="divider">Step 1</div>"#));
    assert_eq!(capture.session().lock().await.state().conversation_index, 1);
}

#[tokio::test]
async fn streamed_reply_is_recorded_after_request() {
    let (capture, store) = mock_capture();
    capture.inner().queue_stream(vec![
        StreamChunk::text("Checking "),
        StreamChunk::tool_calls(vec![tool_delta(0, Some("search"), "{\"q\":")]),
        StreamChunk::text("now."),
        StreamChunk::tool_calls(vec![tool_delta(0, None, "\"rust\"}")]),
        StreamChunk::finish("tool_calls"),
    ]);

    let stream = capture
        .chat_stream(ChatRequest::new("m", vec![Message::user("look it up")]).stream())
        .await
        .unwrap();
    let texts: Vec<String> = stream
        .filter_map(|item| item.ok())
        .filter_map(|chunk| chunk.choices[0].delta.content.clone())
        .collect()
        .await;
    assert_eq!(texts.concat(), "Checking now.");

    capture.flush().await;
    let (_, page) = store.documents().await.remove(0);
    let question = page.find("look it up").unwrap();
    let reply = page.find("Checking now.").unwrap();
    assert!(question < reply);
    assert!(page.contains("Tool | search"));
    assert!(page.contains("&quot;q&quot;: &quot;rust&quot;"));
}

#[tokio::test]
async fn stream_error_reaches_caller_and_document() {
    let (capture, store) = mock_capture();
    capture
        .inner()
        .queue_failing_stream(vec![StreamChunk::text("partial")], "connection reset");

    let items: Vec<Result<StreamChunk>> = capture
        .chat_stream(ChatRequest::new("m", vec![Message::user("q")]).stream())
        .await
        .unwrap()
        .collect()
        .await;
    assert!(matches!(items.last(), Some(Err(Error::Stream(m))) if m == "connection reset"));

    capture.flush().await;
    let (_, page) = store.documents().await.remove(0);
    assert!(page.contains("Error: "));
    assert!(page.contains("connection reset"));
}

#[tokio::test]
async fn failed_stream_call_is_returned_unchanged() {
    let (capture, store) = mock_capture();
    capture.inner().queue_error("unauthorized");

    let err = capture
        .chat_stream(ChatRequest::new("m", vec![Message::user("q")]).stream())
        .await
        .err()
        .unwrap();

    assert!(matches!(err, Error::ProviderApi(ref m) if m.contains("unauthorized")));
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn abandoned_primary_copy_is_still_recorded() {
    let (capture, store) = mock_capture();
    capture
        .inner()
        .queue_stream(vec![StreamChunk::text("unread"), StreamChunk::finish("stop")]);

    let stream = capture
        .chat_stream(ChatRequest::new("m", vec![Message::user("q")]).stream())
        .await
        .unwrap();
    drop(stream);

    capture.flush().await;
    let (_, page) = store.documents().await.remove(0);
    assert!(page.contains("unread"));
}

#[tokio::test]
async fn stalled_stream_is_flushed_partially_on_next_request() {
    let store = Arc::new(MemoryStore::new());
    let client = StalledClient {
        chunks: vec![StreamChunk::text("never finishes")],
    };
    let capture = Capture::with_ingestor(
        client,
        MessageIngestor::new(DocumentSink::new(store.clone())),
        Duration::from_millis(50),
    );

    let _stream = capture
        .chat_stream(ChatRequest::new("m", vec![Message::user("first")]).stream())
        .await
        .unwrap();
    capture
        .chat(ChatRequest::new("m", vec![Message::user("first"), Message::user("again")]))
        .await
        .unwrap();

    let documents = store.documents().await;
    assert_eq!(documents.len(), 2);
    assert!(documents[0].1.contains("first"));
    assert!(!documents[0].1.contains("never finishes"));
    assert!(documents[1].1.contains("unused"));
}

#[tokio::test]
async fn file_backed_capture_writes_html() {
    let temp = TempDir::new().unwrap();
    let config = CaptureConfig {
        output_dir: temp.path().join("logs"),
        ..CaptureConfig::default()
    };
    let capture = Capture::with_config(MockClient::new(), &config);
    capture
        .inner()
        .queue_response(ChatResponse::text("```rust\nfn main() {}\n```"));

    capture
        .chat(ChatRequest::new("m", vec![Message::user("show me `main`")]))
        .await
        .unwrap();

    let entries: Vec<_> = std::fs::read_dir(&config.output_dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1);
    let path = &entries[0];
    assert_eq!(path.extension().unwrap(), "html");
    assert!(
        path.file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("conversation-")
    );

    let page = std::fs::read_to_string(path).unwrap();
    assert!(page.contains(&format!("<title>{}</title>", DEFAULT_TITLE)));
    assert!(page.contains("<code>main</code>"));
    assert!(page.contains(r#"<pre><code class="language-rust">fn main() {}</code></pre>"#));
}
