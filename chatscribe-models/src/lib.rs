//! Chat-completion data model and clients for chatscribe.
//!
//! This crate provides:
//! - Wire types for chat-completions requests, responses, and stream chunks
//! - The [`ChatClient`](providers::ChatClient) trait that capture wraps
//! - [`tee`](stream::tee) for splitting a response stream in two
//! - An OpenAI-compatible HTTP client and a scripted mock client
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     ChatClient                       │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐  │
//! │  │   OpenAi    │  │    Mock     │  │  Decorator  │  │
//! │  │   Client    │  │   Client    │  │ (capture)   │  │
//! │  └─────────────┘  └─────────────┘  └─────────────┘  │
//! └─────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────┐
//! │       ChatResponse  |  ChatStream ──tee──▶ 2 copies  │
//! └─────────────────────────────────────────────────────┘
//! ```

mod error;

pub mod providers;
pub mod stream;

pub use error::{Error, Result};
