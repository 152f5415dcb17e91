use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ConfigError;
use crate::document::Document;
use crate::schema::CollectionSchema;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("collection '{0}' already exists on the server")]
    AlreadyExists(String),
    #[error("'{0}' was not found on the server")]
    NotFound(String),
    #[error("request rejected by the server: {0}")]
    RequestMalformed(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// How bulk-imported documents are applied server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Upsert-or-insert: creates the document if absent, fully replaces
    /// it if present.
    Emplace,
}

impl ImportMode {
    #[must_use]
    pub fn wire_name(&self) -> &'static str {
        match self {
            ImportMode::Emplace => "emplace",
        }
    }
}

/// Per-document outcome of a bulk import.
#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    pub success: bool,
    pub error: Option<String>,
}

/// Result of one bulk-import call.
///
/// A bad document never fails the whole batch; it shows up here as a
/// failed outcome instead.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub outcomes: Vec<DocumentOutcome>,
}

impl ImportReport {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Wire operations against the remote search server.
///
/// Every call blocks (asynchronously) for at most the connection timeout
/// the client was constructed with.
#[async_trait]
pub trait RemoteIndex: Send + Sync {
    /// Whether a collection of this name exists.
    async fn exists(&self, name: &str) -> Result<bool, IndexError>;

    /// Create a collection. Fails with [`IndexError::AlreadyExists`] when
    /// one of that name is already present.
    async fn create(&self, schema: &CollectionSchema) -> Result<(), IndexError>;

    /// Delete a collection. Fails with [`IndexError::NotFound`] when
    /// absent.
    async fn delete(&self, name: &str) -> Result<(), IndexError>;

    /// Insert or fully replace a single document.
    async fn upsert_document(&self, collection: &str, doc: &Document) -> Result<(), IndexError>;

    /// Delete a single document by id. Fails with
    /// [`IndexError::NotFound`] when absent.
    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), IndexError>;

    /// Import a batch of documents. Per-document failures are reported in
    /// the [`ImportReport`], not raised.
    async fn bulk_import(
        &self,
        collection: &str,
        docs: &[Document],
        mode: ImportMode,
    ) -> Result<ImportReport, IndexError>;
}

/// Builds [`RemoteIndex`] clients bound to a per-call connection timeout.
///
/// The bulk importer opens one client per collection so each collection's
/// configured timeout applies to its own import.
pub trait RemoteIndexProvider: Send + Sync {
    fn open(&self, timeout_secs: u64) -> Result<Arc<dyn RemoteIndex>, IndexError>;
}
