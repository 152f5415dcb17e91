// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for index-sync.
//!
//! Uses the `metrics` crate for backend-agnostic collection; the embedding
//! application chooses the exporter.
//!
//! # Metric Naming Convention
//! - `index_sync_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `collection`: remote collection name
//! - `operation`: exists, create, delete, upsert, delete_document, import
//! - `status`: success, error, skipped

use metrics::{counter, histogram};
use std::time::Duration;

/// Record one remote index operation.
pub fn record_remote_operation(operation: &str, status: &str) {
    counter!(
        "index_sync_remote_operations_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record documents pushed to a collection.
pub fn record_documents_imported(collection: &str, count: usize) {
    counter!(
        "index_sync_documents_imported_total",
        "collection" => collection.to_string()
    )
    .increment(count as u64);
}

/// Record the size of one submitted import batch.
pub fn record_batch_size(collection: &str, count: usize) {
    histogram!(
        "index_sync_import_batch_size",
        "collection" => collection.to_string()
    )
    .record(count as f64);
}

/// Record per-document failures reported by a bulk import.
pub fn record_import_failures(collection: &str, count: usize) {
    counter!(
        "index_sync_import_failures_total",
        "collection" => collection.to_string()
    )
    .increment(count as u64);
}

/// Record the wall-clock duration of one collection's import.
pub fn record_import_seconds(collection: &str, duration: Duration) {
    histogram!(
        "index_sync_import_seconds",
        "collection" => collection.to_string()
    )
    .record(duration.as_secs_f64());
}
