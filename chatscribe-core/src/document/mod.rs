//! Output documents
//!
//! A [`Document`] collects the markup fragments of one turn. The
//! [`DocumentSink`] owns the current document, wraps it in the page
//! [`template`] when it closes, and hands the result to a [`DocumentStore`].

pub mod sink;
pub mod store;
pub mod template;

use chrono::Utc;
use uuid::Uuid;

use crate::error::DocumentError;

pub use sink::DocumentSink;
pub use store::{DocumentStore, FileStore, MemoryStore};

/// Prefix of every generated document id
const ID_PREFIX: &str = "conversation";

/// Generate a fresh document id: `conversation-<UTC timestamp>-<short uuid>`
pub fn new_document_id() -> String {
    let stamp = Utc::now().format("%Y%m%d_%H%M%S");
    let short = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", ID_PREFIX, stamp, &short[..8])
}

/// Fragments of one turn, open for appending until closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    id: String,
    fragments: Vec<String>,
    open: bool,
}

impl Document {
    /// Open an empty document
    pub fn open(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fragments: Vec::new(),
            open: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Append one fragment; a closed document rejects it
    pub fn append(&mut self, fragment: impl Into<String>) -> Result<(), DocumentError> {
        if !self.open {
            return Err(DocumentError::Closed(self.id.clone()));
        }
        self.fragments.push(fragment.into());
        Ok(())
    }

    /// Mark closed. Returns false if it already was.
    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_to_open_document() {
        let mut doc = Document::open("d1");
        doc.append("<p>a</p>").unwrap();
        doc.append("<p>b</p>").unwrap();
        assert_eq!(doc.fragments(), ["<p>a</p>", "<p>b</p>"]);
    }

    #[test]
    fn test_closed_document_rejects_append() {
        let mut doc = Document::open("d1");
        assert!(doc.close());
        assert_eq!(
            doc.append("late"),
            Err(DocumentError::Closed("d1".to_string()))
        );
        assert!(doc.fragments().is_empty());
    }

    #[test]
    fn test_close_reports_first_close_only() {
        let mut doc = Document::open("d1");
        assert!(doc.close());
        assert!(!doc.close());
        assert!(!doc.is_open());
    }

    #[test]
    fn test_document_id_format() {
        let id = new_document_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "conversation");
        assert_eq!(parts[1].len(), "20260101_120000".len());
        assert_eq!(parts[2].len(), 8);
        assert_ne!(new_document_id(), id);
    }
}
