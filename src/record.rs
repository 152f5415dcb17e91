//! Contracts the host system fulfills to expose its records.
//!
//! The engine never talks to the host database directly. It sees records
//! through three seams:
//!
//! - [`Record`]: per-record attribute access plus a primary-key identity
//! - [`RecordSource`]: a countable, offset-paginated scan of one record
//!   class (already restricted to the live/published view)
//! - [`RecordStore`]: type existence checks and source construction
//!
//! Lifecycle notifications flow the other way: the host owns a
//! [`RecordEvents`] emitter and calls it from its own persist/delete
//! paths; interested parties (the incremental sync hook) register as
//! [`RecordObserver`]s.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use thiserror::Error;

use crate::document::Document;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("unknown record class '{0}'")]
    UnknownClass(String),
    #[error("record backend error: {0}")]
    Backend(String),
}

/// A single attribute value read off a record.
///
/// Date/time values are kept distinct so the document mapper can convert
/// them to epoch seconds regardless of the declared field type.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Value(Value),
    DateTime(DateTime<Utc>),
}

impl AttrValue {
    /// Collapse into a plain JSON value; date/times become epoch seconds.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            AttrValue::Value(v) => v,
            AttrValue::DateTime(dt) => Value::from(dt.timestamp()),
        }
    }
}

impl From<Value> for AttrValue {
    fn from(v: Value) -> Self {
        AttrValue::Value(v)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Value(Value::from(s))
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Value(Value::from(s))
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        AttrValue::Value(Value::from(n))
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Value(Value::from(b))
    }
}

impl From<DateTime<Utc>> for AttrValue {
    fn from(dt: DateTime<Utc>) -> Self {
        AttrValue::DateTime(dt)
    }
}

/// One typed host record.
pub trait Record: Send + Sync {
    /// Primary-key identity.
    fn id(&self) -> i64;

    /// Concrete record class name (the subtype, not the configured base
    /// class).
    fn class_name(&self) -> &str;

    /// Read a named attribute, if the record has one.
    fn attr(&self, name: &str) -> Option<AttrValue>;

    /// Invoke a same-named computed accessor. Only consulted when the
    /// attribute itself is absent or null.
    fn call(&self, name: &str) -> Option<AttrValue> {
        let _ = name;
        None
    }

    /// Capability override: a record type may shape its own document.
    /// When this returns `Some`, the generic mapper is bypassed entirely.
    fn search_document(&self) -> Option<Document> {
        None
    }
}

/// A countable, offset-paginated scan over the eligible records of one
/// class.
///
/// Implementations must already apply the live/published view where the
/// host distinguishes draft from live, disable any cross-tenant scoping
/// for the duration of the scan, and exclude the subtypes the collection
/// names.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Total eligible records. The importer counts once, up front, purely
    /// for progress reporting; the value may go stale under concurrent
    /// writes.
    async fn count(&self) -> Result<u64, RecordError>;

    /// Fetch up to `limit` records starting at `offset`. An empty page
    /// terminates the import scan.
    async fn page(&self, offset: u64, limit: u32) -> Result<Vec<Arc<dyn Record>>, RecordError>;
}

/// The host's record catalog.
pub trait RecordStore: Send + Sync {
    /// Whether `class_name` denotes a record type the host knows.
    fn has_type(&self, class_name: &str) -> bool;

    /// Open a live-view [`RecordSource`] over `class_name`, excluding the
    /// given subtypes. `None` when the class is unknown.
    fn source(&self, class_name: &str, excluded: &[String]) -> Option<Box<dyn RecordSource>>;
}

/// Receiver for record lifecycle notifications.
///
/// Both methods are best-effort by construction: they return `()`, so no
/// failure can block the originating database mutation.
#[async_trait]
pub trait RecordObserver: Send + Sync {
    /// A record was created or updated.
    async fn record_persisted(&self, record: &dyn Record);

    /// A record is about to be deleted (it still has its identity).
    async fn record_deleting(&self, record: &dyn Record);
}

/// Observer registry the host embeds in its persistence layer.
///
/// The host calls [`emit_persisted`](Self::emit_persisted) after a write
/// commits and [`emit_deleting`](Self::emit_deleting) before a delete.
#[derive(Default)]
pub struct RecordEvents {
    observers: RwLock<Vec<Arc<dyn RecordObserver>>>,
}

impl RecordEvents {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, observer: Arc<dyn RecordObserver>) {
        self.observers.write().push(observer);
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }

    pub async fn emit_persisted(&self, record: &dyn Record) {
        // Snapshot under the lock; never hold it across an await
        let observers: Vec<_> = self.observers.read().clone();
        for observer in observers {
            observer.record_persisted(record).await;
        }
    }

    pub async fn emit_deleting(&self, record: &dyn Record) {
        let observers: Vec<_> = self.observers.read().clone();
        for observer in observers {
            observer.record_deleting(record).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubRecord;

    impl Record for StubRecord {
        fn id(&self) -> i64 {
            7
        }
        fn class_name(&self) -> &str {
            "Page"
        }
        fn attr(&self, name: &str) -> Option<AttrValue> {
            (name == "Title").then(|| AttrValue::from("hello"))
        }
    }

    struct CountingObserver {
        persisted: AtomicUsize,
        deleting: AtomicUsize,
    }

    #[async_trait]
    impl RecordObserver for CountingObserver {
        async fn record_persisted(&self, _record: &dyn Record) {
            self.persisted.fetch_add(1, Ordering::SeqCst);
        }
        async fn record_deleting(&self, _record: &dyn Record) {
            self.deleting.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_attr_value_datetime_collapses_to_epoch_seconds() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let value = AttrValue::from(dt).into_value();
        assert_eq!(value, json!(dt.timestamp()));
    }

    #[test]
    fn test_attr_value_plain_passthrough() {
        assert_eq!(AttrValue::from(42i64).into_value(), json!(42));
        assert_eq!(AttrValue::from(true).into_value(), json!(true));
        assert_eq!(AttrValue::from("x").into_value(), json!("x"));
    }

    #[test]
    fn test_default_record_has_no_override() {
        assert!(StubRecord.search_document().is_none());
        assert!(StubRecord.call("Title").is_none());
    }

    #[tokio::test]
    async fn test_events_reach_every_observer() {
        let events = RecordEvents::new();
        let observer = Arc::new(CountingObserver {
            persisted: AtomicUsize::new(0),
            deleting: AtomicUsize::new(0),
        });
        events.register(observer.clone());
        events.register(observer.clone());
        assert_eq!(events.observer_count(), 2);

        events.emit_persisted(&StubRecord).await;
        events.emit_deleting(&StubRecord).await;

        assert_eq!(observer.persisted.load(Ordering::SeqCst), 2);
        assert_eq!(observer.deleting.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_events_with_no_observers_is_noop() {
        let events = RecordEvents::new();
        events.emit_persisted(&StubRecord).await;
    }
}
