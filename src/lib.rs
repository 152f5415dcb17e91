//! # index-sync
//!
//! Keeps a search-engine index synchronized with typed records stored in a
//! host content-management system's database.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Sync Orchestrator                      │
//! │  • Ensures schema rows from declarative configuration      │
//! │  • Runs collections in ascending rank order               │
//! └─────────────────────────────────────────────────────────────┘
//!                │                              │
//!                ▼                              ▼
//! ┌──────────────────────────┐   ┌──────────────────────────────┐
//! │       Schema Model       │   │          Reconciler          │
//! │  Collections + Fields    │   │  Drop-and-recreate remote    │
//! │  (find-or-make, arena)   │   │  schema to match desired     │
//! └──────────────────────────┘   └──────────────────────────────┘
//!                │                              │
//!                ▼                              ▼
//! ┌──────────────────────────┐   ┌──────────────────────────────┐
//! │      Bulk Importer       │──▶│     Remote Index Client      │
//! │  Paginate record source, │   │  exists / create / delete /  │
//! │  map records, emplace    │   │  upsert / bulk import        │
//! └──────────────────────────┘   └──────────────────────────────┘
//!                ▲                              ▲
//!                │                              │
//! ┌──────────────────────────┐   ┌──────────────────────────────┐
//! │      Record Source       │   │    Incremental Sync Hook     │
//! │  (host seam: live view,  │   │  Observes record lifecycle,  │
//! │  offset pagination)      │   │  pushes single doc changes   │
//! └──────────────────────────┘   └──────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use index_sync::{
//!     DocumentUpdateHook, HttpProvider, SchemaStore, SyncConfig, SyncTask,
//! };
//!
//! let config: SyncConfig = serde_json::from_str(&config_json)?;
//! let schema = Arc::new(SchemaStore::new(records.clone()));
//! let provider = Arc::new(HttpProvider::new(config.server.clone()));
//!
//! // Incremental sync: subscribe to the host's record lifecycle
//! let hook = Arc::new(DocumentUpdateHook::new(
//!     schema.clone(),
//!     provider.clone(),
//!     config.server.connection_timeout_secs,
//! ));
//! record_events.register(hook);
//!
//! // Operator-triggered full sync
//! let task = SyncTask::new(config, schema, records, provider);
//! let report = task.run().await?;
//! println!("pushed {} documents", report.pushed());
//! ```
//!
//! ## Execution model
//!
//! Single task, sequential awaits, no spawned parallelism: collections
//! are reconciled and imported strictly in ascending rank order, and one
//! collection's import completes before the next begins. The only timeout
//! control is the per-call connection timeout; the first unrecovered
//! import failure aborts the remainder of a run.
//!
//! ## Modules
//!
//! - [`orchestrator`]: the [`SyncTask`] driving one full run
//! - [`schema`]: collection/field model and the [`SchemaStore`]
//! - [`document`]: record-to-document projection
//! - [`remote`]: search-server clients (HTTP and in-memory)
//! - [`reconcile`]: drop-and-recreate schema reconciliation
//! - [`import`]: paginated bulk import
//! - [`hooks`]: incremental sync on record lifecycle events
//! - [`record`]: the seams the host system implements
//! - [`config`]: declarative configuration surface

pub mod config;
pub mod document;
pub mod hooks;
pub mod import;
pub mod metrics;
pub mod orchestrator;
pub mod reconcile;
pub mod record;
pub mod remote;
pub mod schema;

pub use config::{CollectionSpec, ConfigError, Node, ServerConfig, SyncConfig};
pub use document::{map_record, Document};
pub use hooks::{DocumentUpdateHook, TypeCache, DEFAULT_TYPE_CACHE_TTL};
pub use import::{import_collection, ImportStats};
pub use orchestrator::{CollectionReport, SyncError, SyncReport, SyncTask};
pub use record::{
    AttrValue, Record, RecordError, RecordEvents, RecordObserver, RecordSource, RecordStore,
};
pub use remote::{
    DocumentOutcome, HttpIndex, HttpProvider, ImportMode, ImportReport, IndexError, MemoryIndex,
    MemoryProvider, RemoteIndex, RemoteIndexProvider,
};
pub use schema::{
    Collection, CollectionId, CollectionSchema, Field, FieldSpec, FieldType, SchemaError,
    SchemaStore,
};
