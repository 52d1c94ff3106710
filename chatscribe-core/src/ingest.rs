//! Turning captured traffic into document fragments
//!
//! [`MessageIngestor`] ties the pieces together: the [`SessionTracker`]
//! decides which messages of a request batch are new, the [`Render`]
//! implementation turns each into markup, and the [`DocumentSink`] collects
//! the fragments until the turn ends with a response or an error.

use std::sync::Arc;

use chatscribe_models::providers::{Content, Message, Role, Tool};
use tracing::{debug, warn};

use crate::document::DocumentSink;
use crate::error::{CaptureError, RenderError};
use crate::render::text::escape_html;
use crate::render::{HtmlRenderer, Render, markup};
use crate::session::{SessionState, SessionTracker};
use crate::tools::format_tool_calls;
use crate::types::AssistantMessage;

/// Tool whose string `output` argument is shown as terminal output
const SHELL_TOOL: &str = "shell";

/// Argument carrying shell output
const SHELL_OUTPUT: &str = "output";

/// Renders request batches, replies and errors into the current document
pub struct MessageIngestor {
    tracker: SessionTracker,
    renderer: Arc<dyn Render>,
    sink: DocumentSink,
}

impl MessageIngestor {
    /// Ingestor using the default [`HtmlRenderer`]
    pub fn new(sink: DocumentSink) -> Self {
        Self::with_renderer(sink, Arc::new(HtmlRenderer::new()))
    }

    pub fn with_renderer(sink: DocumentSink, renderer: Arc<dyn Render>) -> Self {
        Self {
            tracker: SessionTracker::new(),
            renderer,
            sink,
        }
    }

    /// Conversation counters
    pub fn state(&self) -> SessionState {
        self.tracker.state()
    }

    pub fn sink(&self) -> &DocumentSink {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut DocumentSink {
        &mut self.sink
    }

    /// Render the messages of `messages` not seen yet
    ///
    /// A message that fails to render is shown as raw JSON; the rest of the
    /// batch still renders.
    pub async fn ingest_request(
        &mut self,
        messages: &[Message],
        tools: &[Tool],
    ) -> Result<(), CaptureError> {
        let boundary = self.tracker.begin_batch(messages.len());
        if let Some(index) = boundary.divider_index() {
            self.sink.append(markup::divider(index)).await?;
        }

        let pending = self.tracker.pending(messages.len());
        debug!(
            "Ingesting {} of {} messages",
            pending.len(),
            messages.len()
        );

        let last = messages.len().saturating_sub(1);
        for index in pending {
            let message = &messages[index];
            let offered: &[Tool] = if index == last && message.role == Role::User {
                tools
            } else {
                &[]
            };

            let fragment = match self.render_message(message, offered) {
                Ok(html) => html,
                Err(e) => {
                    warn!("Failed to render message {}: {}", index, e);
                    fallback(message)?
                }
            };
            self.sink.append(fragment).await?;
            self.tracker.advance();
        }

        Ok(())
    }

    /// Render the assistant reply and close the turn's document
    pub async fn ingest_response(&mut self, message: &AssistantMessage) -> Result<(), CaptureError> {
        let body = match self.render_reply(message) {
            Ok(html) => html,
            Err(e) => {
                warn!("Failed to render assistant reply: {}", e);
                markup::raw_json(&serde_json::to_string(message)?)
            }
        };
        self.sink.append(markup::message(Role::Assistant, &body)).await?;
        self.tracker.advance();

        for call in message.tool_calls.iter().filter(|c| c.name == SHELL_TOOL) {
            if let Some(output) = call.string_argument(SHELL_OUTPUT) {
                self.sink.append(markup::tool_output(output)).await?;
            }
        }

        self.sink.close().await;
        Ok(())
    }

    /// Record a failed call and close the turn's document
    pub async fn ingest_error(&mut self, message: &str) -> Result<(), CaptureError> {
        let text = format!("Error: {}", message);
        let body = self
            .renderer
            .render(&Content::text(text.as_str()))
            .unwrap_or_else(|e| {
                warn!("Failed to render error message: {}", e);
                escape_html(&text)
            });
        self.sink.append(markup::message(Role::System, &body)).await?;
        self.tracker.advance();
        self.sink.close().await;
        Ok(())
    }

    /// Close whatever is open, keeping the fragments gathered so far
    pub async fn close(&mut self) -> Option<String> {
        self.sink.close().await
    }

    fn render_message(&self, message: &Message, tools: &[Tool]) -> Result<String, RenderError> {
        let mut body = self.renderer.render(&message.content)?;
        for call in format_tool_calls(&message.tool_calls) {
            push_line(&mut body, &markup::tool_call(&call));
        }
        if !tools.is_empty() {
            push_line(&mut body, &markup::tools_data(tools));
        }
        Ok(markup::message(message.role, &body))
    }

    fn render_reply(&self, message: &AssistantMessage) -> Result<String, RenderError> {
        let mut body = self.renderer.render(&Content::text(message.text.as_str()))?;
        for call in &message.tool_calls {
            push_line(&mut body, &markup::tool_call(call));
        }
        Ok(body)
    }
}

/// Role container holding the message as escaped raw JSON
fn fallback(message: &Message) -> Result<String, CaptureError> {
    let json = serde_json::to_string(message)?;
    Ok(markup::message(message.role, &markup::raw_json(&json)))
}

fn push_line(body: &mut String, html: &str) {
    if !body.is_empty() {
        body.push('\n');
    }
    body.push_str(html);
}
