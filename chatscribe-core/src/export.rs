//! One-shot export of a saved conversation

use chatscribe_models::providers::Message;
use serde::Deserialize;

use crate::document::DocumentSink;
use crate::error::CaptureError;
use crate::ingest::MessageIngestor;

/// Accepted shapes of a saved conversation
#[derive(Deserialize)]
#[serde(untagged)]
enum SavedConversation {
    Messages(Vec<Message>),
    Wrapped { messages: Vec<Message> },
}

/// Parse a JSON array of messages, or an object with a `messages` array
pub fn parse_conversation(json: &str) -> Result<Vec<Message>, CaptureError> {
    Ok(match serde_json::from_str(json)? {
        SavedConversation::Messages(messages) => messages,
        SavedConversation::Wrapped { messages } => messages,
    })
}

/// Render every message into a single document and close it
///
/// Returns the id of the written document, or `None` for an empty
/// conversation.
pub async fn export_conversation(
    sink: DocumentSink,
    messages: &[Message],
) -> Result<Option<String>, CaptureError> {
    if messages.is_empty() {
        return Ok(None);
    }
    let mut ingestor = MessageIngestor::new(sink);
    ingestor.ingest_request(messages, &[]).await?;
    Ok(ingestor.close().await)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chatscribe_models::providers::Role;

    use super::*;
    use crate::document::MemoryStore;

    #[test]
    fn test_parse_plain_array() {
        let messages =
            parse_conversation(r#"[{"role":"user","content":"hi"},{"role":"assistant","content":null}]"#)
                .unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, Role::Assistant);
        assert!(messages[1].content.is_empty());
    }

    #[test]
    fn test_parse_wrapped_object() {
        let messages =
            parse_conversation(r#"{"messages":[{"role":"system","content":"s"}]}"#).unwrap();
        assert_eq!(messages[0].role, Role::System);
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        assert!(parse_conversation(r#"{"turns":[]}"#).is_err());
    }

    #[tokio::test]
    async fn test_export_writes_one_document_in_order() {
        let store = Arc::new(MemoryStore::new());
        let messages = vec![
            Message::user("first question"),
            Message::assistant("first answer"),
            Message::user("second question"),
        ];

        let id = export_conversation(DocumentSink::new(store.clone()), &messages)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(store.len().await, 1);
        let page = store.get(&id).await.unwrap();
        let a = page.find("first question").unwrap();
        let b = page.find("first answer").unwrap();
        let c = page.find("second question").unwrap();
        assert!(a < b && b < c);
        assert!(!page.contains("divider"));
    }

    #[tokio::test]
    async fn test_export_of_nothing_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let id = export_conversation(DocumentSink::new(store.clone()), &[])
            .await
            .unwrap();
        assert!(id.is_none());
        assert!(store.is_empty().await);
    }
}
