//! In-process implementation of [`RemoteIndex`].
//!
//! Backs the integration tests and the demo, and doubles as a local index
//! for embedders that don't run a search server. Semantics mirror the
//! HTTP client's: create conflicts, missing-target deletes and per-document
//! import failures behave exactly like the real server's responses.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use crate::document::Document;
use crate::schema::CollectionSchema;

use super::traits::{
    DocumentOutcome, ImportMode, ImportReport, IndexError, RemoteIndex, RemoteIndexProvider,
};

struct MemoryCollection {
    schema: CollectionSchema,
    documents: DashMap<String, Document>,
}

#[derive(Default)]
pub struct MemoryIndex {
    collections: DashMap<String, Arc<MemoryCollection>>,
}

impl MemoryIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of collections currently present.
    #[must_use]
    pub fn collection_count(&self) -> usize {
        self.collections.len()
    }

    /// Number of documents in a collection, `None` when it doesn't exist.
    #[must_use]
    pub fn document_count(&self, name: &str) -> Option<usize> {
        self.collections.get(name).map(|c| c.documents.len())
    }

    /// Snapshot of every document in a collection (the `*` search).
    #[must_use]
    pub fn search_all(&self, name: &str) -> Vec<Document> {
        self.collections
            .get(name)
            .map(|c| c.documents.iter().map(|d| d.value().clone()).collect())
            .unwrap_or_default()
    }

    /// The schema the collection was created with.
    #[must_use]
    pub fn schema_of(&self, name: &str) -> Option<CollectionSchema> {
        self.collections.get(name).map(|c| c.schema.clone())
    }

    pub fn clear(&self) {
        self.collections.clear();
    }

    fn collection(&self, name: &str) -> Result<Arc<MemoryCollection>, IndexError> {
        self.collections
            .get(name)
            .map(|c| c.value().clone())
            .ok_or_else(|| IndexError::NotFound(name.to_string()))
    }
}

fn document_id(doc: &Document) -> Option<String> {
    match doc.get("id") {
        Some(Value::String(id)) => Some(id.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl RemoteIndex for MemoryIndex {
    async fn exists(&self, name: &str) -> Result<bool, IndexError> {
        Ok(self.collections.contains_key(name))
    }

    async fn create(&self, schema: &CollectionSchema) -> Result<(), IndexError> {
        if self.collections.contains_key(&schema.name) {
            return Err(IndexError::AlreadyExists(schema.name.clone()));
        }
        self.collections.insert(
            schema.name.clone(),
            Arc::new(MemoryCollection {
                schema: schema.clone(),
                documents: DashMap::new(),
            }),
        );
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), IndexError> {
        self.collections
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| IndexError::NotFound(name.to_string()))
    }

    async fn upsert_document(&self, collection: &str, doc: &Document) -> Result<(), IndexError> {
        let collection = self.collection(collection)?;
        let id = document_id(doc)
            .ok_or_else(|| IndexError::RequestMalformed("document is missing an id".to_string()))?;
        collection.documents.insert(id, doc.clone());
        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), IndexError> {
        let collection = self.collection(collection)?;
        collection
            .documents
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| IndexError::NotFound(id.to_string()))
    }

    async fn bulk_import(
        &self,
        collection: &str,
        docs: &[Document],
        _mode: ImportMode,
    ) -> Result<ImportReport, IndexError> {
        let collection = self.collection(collection)?;
        let outcomes = docs
            .iter()
            .map(|doc| match document_id(doc) {
                Some(id) => {
                    collection.documents.insert(id, doc.clone());
                    DocumentOutcome {
                        success: true,
                        error: None,
                    }
                }
                None => DocumentOutcome {
                    success: false,
                    error: Some("document is missing an id".to_string()),
                },
            })
            .collect();
        Ok(ImportReport { outcomes })
    }
}

/// Hands out the same shared [`MemoryIndex`] regardless of the requested
/// timeout (there is no connection to time out).
pub struct MemoryProvider {
    index: Arc<MemoryIndex>,
}

impl MemoryProvider {
    #[must_use]
    pub fn new(index: Arc<MemoryIndex>) -> Self {
        Self { index }
    }
}

impl RemoteIndexProvider for MemoryProvider {
    fn open(&self, _timeout_secs: u64) -> Result<Arc<dyn RemoteIndex>, IndexError> {
        Ok(self.index.clone())
    }
}
