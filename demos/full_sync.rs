// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Full-sync walkthrough against the in-memory backends.
//!
//! Demonstrates:
//! 1. Declaring two collections in configuration
//! 2. Running the operator-triggered full sync
//! 3. Incremental sync through the record lifecycle hook
//! 4. Displaying captured metrics
//!
//! # Run
//!
//! ```bash
//! cargo run --example full_sync
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use serde_json::json;

use index_sync::{
    AttrValue, DocumentUpdateHook, MemoryIndex, MemoryProvider, Record, RecordError, RecordEvents,
    RecordSource, RecordStore, SchemaStore, SyncConfig, SyncTask,
};

// ─────────────────────────────────────────────────────────────────────────
// A tiny in-memory host system: pages and products
// ─────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
struct DemoRecord {
    id: i64,
    class_name: &'static str,
    title: String,
    content: String,
}

impl Record for DemoRecord {
    fn id(&self) -> i64 {
        self.id
    }
    fn class_name(&self) -> &str {
        self.class_name
    }
    fn attr(&self, name: &str) -> Option<AttrValue> {
        match name {
            "id" => Some(AttrValue::from(self.id)),
            "class_name" => Some(AttrValue::from(self.class_name)),
            "Title" => Some(AttrValue::from(self.title.clone())),
            "Content" => Some(AttrValue::from(self.content.clone())),
            "created" | "last_edited" => Some(AttrValue::from(
                Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap(),
            )),
            _ => None,
        }
    }
}

struct DemoSource {
    records: Vec<Arc<DemoRecord>>,
}

#[async_trait]
impl RecordSource for DemoSource {
    async fn count(&self) -> Result<u64, RecordError> {
        Ok(self.records.len() as u64)
    }
    async fn page(&self, offset: u64, limit: u32) -> Result<Vec<Arc<dyn Record>>, RecordError> {
        Ok(self
            .records
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|r| r.clone() as Arc<dyn Record>)
            .collect())
    }
}

struct DemoStore {
    records: Vec<Arc<DemoRecord>>,
}

impl RecordStore for DemoStore {
    fn has_type(&self, class_name: &str) -> bool {
        matches!(class_name, "Page" | "Product")
    }
    fn source(&self, class_name: &str, excluded: &[String]) -> Option<Box<dyn RecordSource>> {
        if !self.has_type(class_name) {
            return None;
        }
        let records = self
            .records
            .iter()
            .filter(|r| r.class_name == class_name)
            .filter(|r| !excluded.contains(&r.class_name.to_lowercase()))
            .cloned()
            .collect();
        Some(Box::new(DemoSource { records }))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder.install().expect("failed to install metrics recorder");

    tracing_subscriber::fmt().with_target(false).compact().init();

    println!("\n=== index-sync: full sync walkthrough ===\n");

    // ─────────────────────────────────────────────────────────────────────
    // 1. Configuration: two collections, Pages first by rank
    // ─────────────────────────────────────────────────────────────────────
    let config: SyncConfig = serde_json::from_value(json!({
        "server": { "url": "http://localhost:8108", "api_key": "demo" },
        "collections": {
            "Page": {
                "name": "Pages",
                "import_limit": 3,
                "fields": [
                    { "name": "Title", "type": "string", "sort": true },
                    { "name": "Content", "type": "string" }
                ]
            },
            "Product": {
                "name": "Products",
                "fields": [
                    { "name": "Title", "type": "string" }
                ]
            }
        }
    }))
    .expect("demo config is valid");

    let records = Arc::new(DemoStore {
        records: (1..=8)
            .map(|i| {
                Arc::new(DemoRecord {
                    id: i,
                    class_name: if i <= 5 { "Page" } else { "Product" },
                    title: format!("Record {i}"),
                    content: format!("Body of record {i}"),
                })
            })
            .collect(),
    });

    let index = Arc::new(MemoryIndex::new());
    let provider = Arc::new(MemoryProvider::new(index.clone()));
    let schema = Arc::new(SchemaStore::new(records.clone()));

    // ─────────────────────────────────────────────────────────────────────
    // 2. Operator-triggered full sync
    // ─────────────────────────────────────────────────────────────────────
    println!("Running full sync...");
    let task = SyncTask::new(config.clone(), schema.clone(), records.clone(), provider.clone());
    let report = match task.run().await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("sync failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    for entry in &report.collections {
        println!(
            "  {}: {}/{} documents ({} batches){}",
            entry.collection,
            entry.stats.pushed,
            entry.stats.total,
            entry.stats.batches,
            if entry.reconciled { ", schema created" } else { "" },
        );
    }

    // ─────────────────────────────────────────────────────────────────────
    // 3. Incremental sync through the lifecycle hook
    // ─────────────────────────────────────────────────────────────────────
    println!("\nSimulating a record write and a delete...");
    let events = RecordEvents::new();
    events.register(Arc::new(DocumentUpdateHook::new(
        schema.clone(),
        provider.clone(),
        config.server.connection_timeout_secs,
    )));

    let edited = DemoRecord {
        id: 2,
        class_name: "Page",
        title: "Record 2 (edited)".to_string(),
        content: "Updated body".to_string(),
    };
    events.emit_persisted(&edited).await;

    let doomed = DemoRecord {
        id: 5,
        class_name: "Page",
        title: String::new(),
        content: String::new(),
    };
    events.emit_deleting(&doomed).await;

    println!(
        "  Pages now holds {} documents",
        index.document_count("Pages").unwrap_or(0)
    );

    // ─────────────────────────────────────────────────────────────────────
    // 4. Captured metrics
    // ─────────────────────────────────────────────────────────────────────
    println!("\nMetrics:");
    for (key, _, _, value) in snapshotter.snapshot().into_vec() {
        if let DebugValue::Counter(count) = value {
            println!("  {} = {}", key.key().name(), count);
        }
    }

    println!("\nDone.");
    ExitCode::SUCCESS
}
