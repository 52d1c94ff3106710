//! chatscribe-core: capture of chat-completion traffic into HTML transcripts
//!
//! This crate provides the capture pipeline:
//!
//! - **Capture** - [`Capture`] wraps any [`ChatClient`] and records each exchange
//! - **Session tracking** - [`SessionTracker`] decides where conversations start
//! - **Rendering** - [`HtmlRenderer`] turns message content into safe markup
//! - **Stream aggregation** - [`StreamAggregator`] rebuilds a reply from chunks
//! - **Documents** - [`DocumentSink`] and [`DocumentStore`] persist each turn
//!
//! # Quick Start
//!
//! ```no_run
//! use chatscribe_core::{Capture, CaptureConfig};
//! use chatscribe_models::providers::{ChatClient, ChatRequest, Message, OpenAiClient};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Capture::with_config(OpenAiClient::new("sk-..."), &CaptureConfig::default());
//!
//!     let request = ChatRequest::new("gpt-4o-mini", vec![Message::user("Hello!")]);
//!     let response = client.chat(request).await?;
//!     println!("{:?}", response.first_message());
//!
//!     client.flush().await;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                    Capture<C>                         │
//! │   request ──▶ MessageIngestor ◀── response / stream   │
//! │                ┌───────────┴───────────┐              │
//! │         SessionTracker          HtmlRenderer          │
//! │                └───────────┬───────────┘              │
//! │                       DocumentSink                    │
//! └────────────────────────────┬─────────────────────────┘
//!                              ▼
//!                DocumentStore (FileStore | MemoryStore)
//! ```

pub mod aggregator;
pub mod capture;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod ingest;
pub mod render;
pub mod session;
pub mod tools;
pub mod types;

// Re-export key types for convenience
pub use aggregator::{AggregatorState, StreamAggregator};
pub use capture::{Capture, CaptureSession};
pub use chatscribe_models::providers::ChatClient;
pub use config::CaptureConfig;
pub use document::{Document, DocumentSink, DocumentStore, FileStore, MemoryStore};
pub use error::{CaptureError, ConfigError, DocumentError, RenderError, StoreError};
pub use export::{export_conversation, parse_conversation};
pub use ingest::MessageIngestor;
pub use render::{Fragment, HtmlRenderer, Render, render_fragments};
pub use session::{Boundary, SessionState, SessionTracker};
pub use tools::{FormattedToolCall, format_tool_calls};
pub use types::AssistantMessage;
