//! Bulk import: stream a collection's records into the remote index.
//!
//! The importer paginates the record source at the collection's batch
//! size, maps each page into documents and submits the non-empty batch
//! with emplace (upsert-or-insert) semantics, so re-running an import is
//! idempotent.
//!
//! The total used for progress reporting is counted once, before the
//! loop; under concurrent writes the `pushed/total` ratio can exceed
//! 100% or under-report. The offset always advances by the batch size,
//! never by the number of records actually fetched, so a short page is
//! followed by one final empty fetch that ends the loop.
//!
//! Remote failures from the bulk-import call are not caught here: they
//! abort the remaining pagination and surface to the orchestrator.

use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::document::{map_record, Document};
use crate::orchestrator::SyncError;
use crate::record::{RecordError, RecordStore};
use crate::remote::{ImportMode, RemoteIndexProvider};
use crate::schema::{Collection, Field};

/// Outcome of one collection's import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// Eligible records counted before the scan began
    pub total: u64,
    /// Records processed by the pagination loop
    pub pushed: u64,
    /// Bulk-import calls issued
    pub batches: u32,
}

/// Import every eligible record of `collection` into the remote index.
///
/// Opens a remote client bound to the collection's connection timeout and
/// scans the live view of its record class, excluding the configured
/// subtypes. Records that map to an empty document are skipped.
pub async fn import_collection(
    provider: &dyn RemoteIndexProvider,
    records: &dyn RecordStore,
    collection: &Collection,
    fields: &[Field],
) -> Result<ImportStats, SyncError> {
    let batch_size = collection.import_batch_size.max(1);
    let timeout_secs = collection.connection_timeout_secs.max(1);
    let remote = provider.open(timeout_secs)?;

    let source = records
        .source(&collection.record_class, &collection.excluded_classes)
        .ok_or_else(|| RecordError::UnknownClass(collection.record_class.clone()))?;

    let started = Instant::now();
    let total = source.count().await?;
    info!(
        collection = %collection.name,
        limit = batch_size,
        timeout = timeout_secs,
        total,
        "indexing collection"
    );
    if total == 0 {
        info!(collection = %collection.name, "no documents found");
    }

    let fields_array = collection.fields_array(fields);
    let mut stats = ImportStats {
        total,
        ..Default::default()
    };
    let mut offset: u64 = 0;

    loop {
        let page = source.page(offset, batch_size).await?;
        if page.is_empty() {
            break;
        }
        let fetched = page.len() as u64;

        let docs: Vec<Document> = page
            .iter()
            .map(|record| map_record(record.as_ref(), &fields_array))
            .filter(|doc| !doc.is_empty())
            .collect();

        if !docs.is_empty() {
            let batch_id = Uuid::new_v4();
            debug!(
                collection = %collection.name,
                %batch_id,
                documents = docs.len(),
                offset,
                "submitting import batch"
            );
            let report = remote
                .bulk_import(&collection.name, &docs, ImportMode::Emplace)
                .await?;
            crate::metrics::record_batch_size(&collection.name, docs.len());
            crate::metrics::record_documents_imported(&collection.name, report.succeeded());
            if report.failed() > 0 {
                crate::metrics::record_import_failures(&collection.name, report.failed());
                warn!(
                    collection = %collection.name,
                    %batch_id,
                    failed = report.failed(),
                    "some documents were rejected by the server"
                );
            }
            stats.batches += 1;
        }

        stats.pushed += fetched;
        info!(
            collection = %collection.name,
            pushed = stats.pushed,
            total,
            "added documents to collection"
        );

        // Always advance by the full batch size: a short page is followed
        // by one empty fetch that terminates the loop.
        offset += u64::from(batch_size);
    }

    crate::metrics::record_import_seconds(&collection.name, started.elapsed());
    Ok(stats)
}
