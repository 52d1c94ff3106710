//! Persistence for closed documents

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreError;

/// File extension of rendered documents
const EXTENSION: &str = "html";

/// Receives each closed document exactly once
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn write(&self, id: &str, content: &str) -> Result<(), StoreError>;
}

/// Writes `<dir>/<id>.html`, creating the directory on demand
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a document with `id` is written to
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", id, EXTENSION))
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn write(&self, id: &str, content: &str) -> Result<(), StoreError> {
        let io_error = |source| StoreError::Write {
            id: id.to_string(),
            source,
        };

        fs::create_dir_all(&self.dir).await.map_err(io_error)?;
        let path = self.path_for(id);
        fs::write(&path, content).await.map_err(io_error)?;

        debug!("Wrote document {} to {}", id, path.display());
        Ok(())
    }
}

/// Keeps documents in memory, keyed by id
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, String>>,
    order: RwLock<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content of the document with `id`
    pub async fn get(&self, id: &str) -> Option<String> {
        self.documents.read().await.get(id).cloned()
    }

    /// Ids in write order
    pub async fn ids(&self) -> Vec<String> {
        self.order.read().await.clone()
    }

    /// All documents in write order
    pub async fn documents(&self) -> Vec<(String, String)> {
        let documents = self.documents.read().await;
        self.order
            .read()
            .await
            .iter()
            .filter_map(|id| documents.get(id).map(|c| (id.clone(), c.clone())))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.order.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn write(&self, id: &str, content: &str) -> Result<(), StoreError> {
        let previous = self
            .documents
            .write()
            .await
            .insert(id.to_string(), content.to_string());
        if previous.is_none() {
            self.order.write().await.push(id.to_string());
        }
        Ok(())
    }
}
