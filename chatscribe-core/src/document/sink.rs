//! Document lifecycle: open, append, close

use std::sync::Arc;

use tracing::{debug, error};

use super::store::DocumentStore;
use super::template::{self, DEFAULT_TITLE};
use super::{Document, new_document_id};
use crate::error::DocumentError;

/// Owns the current [`Document`] and persists it on close
///
/// The next append after a close opens a fresh document, so each turn ends
/// up in its own output.
pub struct DocumentSink {
    store: Arc<dyn DocumentStore>,
    title: String,
    current: Option<Document>,
    last_closed: Option<String>,
}

impl DocumentSink {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            title: DEFAULT_TITLE.to_string(),
            current: None,
            last_closed: None,
        }
    }

    /// Set the page title used for documents closed from now on
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// The open document, if any
    pub fn current(&self) -> Option<&Document> {
        self.current.as_ref().filter(|doc| doc.is_open())
    }

    pub fn is_open(&self) -> bool {
        self.current().is_some()
    }

    /// Id of the most recently closed document
    pub fn last_closed(&self) -> Option<&str> {
        self.last_closed.as_deref()
    }

    /// Open a document with `id`, closing any document still open
    pub async fn open(&mut self, id: impl Into<String>) -> &Document {
        self.close().await;
        let id = id.into();
        debug!("Opening document {}", id);
        self.current.insert(Document::open(id))
    }

    /// Append a fragment, opening a fresh document if none is open
    pub async fn append(&mut self, fragment: impl Into<String>) -> Result<(), DocumentError> {
        if !self.is_open() {
            self.open(new_document_id()).await;
        }
        match self.current.as_mut() {
            Some(doc) => doc.append(fragment),
            None => Ok(()),
        }
    }

    /// Close the open document and write it to the store
    ///
    /// Returns the closed id, or `None` when nothing was open. A store
    /// failure is logged and otherwise ignored.
    pub async fn close(&mut self) -> Option<String> {
        let doc = self.current.as_mut()?;
        if !doc.close() {
            return None;
        }

        let id = doc.id().to_string();
        let page = template::render_page(&self.title, doc.fragments());
        self.current = None;

        if let Err(e) = self.store.write(&id, &page).await {
            error!("Failed to persist document {}: {}", id, e);
        } else {
            debug!("Closed document {}", id);
        }
        self.last_closed = Some(id.clone());
        Some(id)
    }
}
