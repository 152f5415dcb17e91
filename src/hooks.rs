// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Incremental sync: react to single-record mutations.
//!
//! [`DocumentUpdateHook`] subscribes to the host's record lifecycle (see
//! [`RecordEvents`](crate::record::RecordEvents)) and pushes one document
//! change per persisted or deleted record. It is strictly best-effort:
//! observer methods return `()`, so an indexing failure can never block
//! the originating database write or delete.
//!
//! A per-write schema lookup would be wasteful, so the set of configured
//! record classes is cached in a [`TypeCache`] with a 24 h default TTL.
//! The cache is read-mostly shared state; recomputing it redundantly is
//! cheap and idempotent, so no cross-invocation coordination is needed
//! beyond the lock.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::document::map_record;
use crate::record::{Record, RecordObserver};
use crate::remote::{IndexError, RemoteIndexProvider};
use crate::schema::SchemaStore;

/// How long a computed type set stays fresh.
pub const DEFAULT_TYPE_CACHE_TTL: Duration = Duration::from_secs(86_400);

struct CachedTypes {
    computed_at: Instant,
    types: HashSet<String>,
}

/// Time-boxed cache of the configured source-record-type set.
pub struct TypeCache {
    ttl: Duration,
    inner: RwLock<Option<CachedTypes>>,
}

impl TypeCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: RwLock::new(None),
        }
    }

    /// Return the cached set, recomputing through `compute` when the
    /// entry is missing or older than the TTL.
    pub fn get_or_recompute(&self, compute: impl FnOnce() -> HashSet<String>) -> HashSet<String> {
        if let Some(cached) = self.inner.read().as_ref() {
            if cached.computed_at.elapsed() < self.ttl {
                return cached.types.clone();
            }
        }
        let types = compute();
        *self.inner.write() = Some(CachedTypes {
            computed_at: Instant::now(),
            types: types.clone(),
        });
        types
    }

    /// Drop the cached set; the next lookup recomputes.
    pub fn invalidate(&self) {
        *self.inner.write() = None;
    }

    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.inner.read().is_some()
    }
}

impl Default for TypeCache {
    fn default() -> Self {
        Self::new(DEFAULT_TYPE_CACHE_TTL)
    }
}

/// Lifecycle observer that mirrors single-record changes into the remote
/// index.
pub struct DocumentUpdateHook {
    schema: Arc<SchemaStore>,
    provider: Arc<dyn RemoteIndexProvider>,
    timeout_secs: u64,
    types: TypeCache,
}

impl DocumentUpdateHook {
    pub fn new(
        schema: Arc<SchemaStore>,
        provider: Arc<dyn RemoteIndexProvider>,
        timeout_secs: u64,
    ) -> Self {
        Self::with_cache_ttl(schema, provider, timeout_secs, DEFAULT_TYPE_CACHE_TTL)
    }

    pub fn with_cache_ttl(
        schema: Arc<SchemaStore>,
        provider: Arc<dyn RemoteIndexProvider>,
        timeout_secs: u64,
        ttl: Duration,
    ) -> Self {
        Self {
            schema,
            provider,
            timeout_secs,
            types: TypeCache::new(ttl),
        }
    }

    /// Force the next lookup to recompute the configured type set, e.g.
    /// after collections were added or deleted.
    pub fn invalidate_types(&self) {
        self.types.invalidate();
    }

    fn is_indexed_type(&self, class_name: &str) -> bool {
        let types = self
            .types
            .get_or_recompute(|| self.schema.record_classes().into_iter().collect());
        types.contains(class_name)
    }
}

#[async_trait]
impl RecordObserver for DocumentUpdateHook {
    async fn record_persisted(&self, record: &dyn Record) {
        if !self.is_indexed_type(record.class_name()) {
            return;
        }
        let Some(collection) = self.schema.find_by_record_class(record.class_name()) else {
            return;
        };
        let remote = match self.provider.open(self.timeout_secs) {
            Ok(remote) => remote,
            Err(e) => {
                warn!(error = %e, "could not open remote index for incremental upsert");
                return;
            }
        };

        let fields = collection.fields_array(&self.schema.fields_of(collection.id));
        let doc = map_record(record, &fields);

        match remote.upsert_document(&collection.name, &doc).await {
            Ok(()) => {
                debug!(collection = %collection.name, id = record.id(), "document upserted");
                crate::metrics::record_remote_operation("upsert", "success");
            }
            Err(IndexError::RequestMalformed(msg)) => {
                info!(collection = %collection.name, id = record.id(), error = %msg, "document rejected, not retried");
                crate::metrics::record_remote_operation("upsert", "skipped");
            }
            Err(e) => {
                warn!(collection = %collection.name, id = record.id(), error = %e, "incremental upsert failed");
                crate::metrics::record_remote_operation("upsert", "error");
            }
        }
    }

    async fn record_deleting(&self, record: &dyn Record) {
        if !self.is_indexed_type(record.class_name()) {
            return;
        }
        let Some(collection) = self.schema.find_by_record_class(record.class_name()) else {
            return;
        };
        if record.id() == 0 {
            // Never persisted; nothing can exist remotely
            return;
        }
        let remote = match self.provider.open(self.timeout_secs) {
            Ok(remote) => remote,
            Err(e) => {
                warn!(error = %e, "could not open remote index for incremental delete");
                return;
            }
        };

        match remote
            .delete_document(&collection.name, &record.id().to_string())
            .await
        {
            Ok(()) => {
                debug!(collection = %collection.name, id = record.id(), "document deleted");
                crate::metrics::record_remote_operation("delete_document", "success");
            }
            Err(IndexError::NotFound(_)) => {
                info!(collection = %collection.name, id = record.id(), "document already absent");
                crate::metrics::record_remote_operation("delete_document", "skipped");
            }
            Err(e) => {
                warn!(collection = %collection.name, id = record.id(), error = %e, "incremental delete failed");
                crate::metrics::record_remote_operation("delete_document", "error");
            }
        }
    }
}
