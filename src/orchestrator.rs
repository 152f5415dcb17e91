// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! The full-sync entry point.
//!
//! [`SyncTask`] owns the configuration and the three collaborator seams
//! (schema store, record store, remote index provider) and drives one
//! operator-triggered run: ensure schema rows from configuration,
//! reconcile missing remote collections, bulk-import each enabled
//! collection in ascending rank order.
//!
//! Execution is strictly sequential: one collection's import completes
//! before the next begins, and the first unrecovered failure aborts the
//! remainder of the run, leaving collections later in rank order unsynced
//! until the next run.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, SyncConfig};
use crate::import::{import_collection, ImportStats};
use crate::reconcile::{reconcile, reconcile_delete};
use crate::record::{RecordError, RecordStore};
use crate::remote::{IndexError, RemoteIndexProvider};
use crate::schema::{Collection, CollectionId, SchemaError, SchemaStore};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Records(#[from] RecordError),
}

/// Per-collection outcome of one run.
#[derive(Debug, Clone)]
pub struct CollectionReport {
    pub collection: String,
    pub stats: ImportStats,
    /// Whether the remote collection had to be created this run
    pub reconciled: bool,
}

/// Outcome of one full sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub collections: Vec<CollectionReport>,
}

impl SyncReport {
    /// Total documents processed across all collections.
    #[must_use]
    pub fn pushed(&self) -> u64 {
        self.collections.iter().map(|c| c.stats.pushed).sum()
    }
}

/// Orchestrates one full synchronization run.
pub struct SyncTask {
    config: SyncConfig,
    schema: Arc<SchemaStore>,
    records: Arc<dyn RecordStore>,
    provider: Arc<dyn RemoteIndexProvider>,
}

impl SyncTask {
    pub fn new(
        config: SyncConfig,
        schema: Arc<SchemaStore>,
        records: Arc<dyn RecordStore>,
        provider: Arc<dyn RemoteIndexProvider>,
    ) -> Self {
        Self {
            config,
            schema,
            records,
            provider,
        }
    }

    #[must_use]
    pub fn schema(&self) -> &Arc<SchemaStore> {
        &self.schema
    }

    /// Run one full sync.
    ///
    /// Steps, strictly ordered:
    /// 1. Find-or-make a schema row for every configured entry with a
    ///    non-empty name.
    /// 2. Fetch enabled collections, ascending rank.
    /// 3. For each: reconcile the remote collection if it doesn't exist
    ///    yet, then import unconditionally (emplace makes it idempotent).
    ///
    /// Zero configured collections is a successful no-op.
    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        for (record_class, spec) in &self.config.collections {
            if spec.name.is_empty() {
                continue;
            }
            self.schema.find_or_make(&spec.name, record_class, spec)?;
        }

        let collections = self.schema.enabled_by_rank();
        if collections.is_empty() {
            info!("no collections configured, nothing to sync");
            return Ok(SyncReport::default());
        }

        let mut report = SyncReport::default();
        for collection in collections {
            let remote = self
                .provider
                .open(self.config.server.connection_timeout_secs)?;
            let fields = self.schema.fields_of(collection.id);

            let mut reconciled = false;
            if !remote.exists(&collection.name).await? {
                reconcile(remote.as_ref(), &collection, &fields).await?;
                reconciled = true;
            }

            let stats = import_collection(
                self.provider.as_ref(),
                self.records.as_ref(),
                &collection,
                &fields,
            )
            .await?;

            report.collections.push(CollectionReport {
                collection: collection.name.clone(),
                stats,
                reconciled,
            });
        }

        info!(
            collections = report.collections.len(),
            documents = report.pushed(),
            "sync run complete"
        );
        Ok(report)
    }

    /// Operator action: delete a collection.
    ///
    /// Cascade-deletes the local schema row and its fields, then makes a
    /// best-effort attempt to delete the remote collection (absence over
    /// there is not an error). Returns the removed collection, or `None`
    /// when the id was unknown.
    pub async fn delete_collection(
        &self,
        id: CollectionId,
    ) -> Result<Option<Collection>, SyncError> {
        let Some(collection) = self.schema.delete(id) else {
            return Ok(None);
        };
        let remote = self
            .provider
            .open(self.config.server.connection_timeout_secs)?;
        reconcile_delete(remote.as_ref(), &collection).await;
        Ok(Some(collection))
    }
}
