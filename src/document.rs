//! Record-to-document projection.
//!
//! A [`Document`] is the flat key/value shape shipped to the remote index.
//! [`map_record`] produces one from a record and the collection's field
//! descriptors; a record type that implements
//! [`Record::search_document`](crate::record::Record::search_document)
//! bypasses the generic projection entirely.

use serde_json::{Map, Value};

use crate::record::{AttrValue, Record};
use crate::schema::FieldSpec;

/// The flattened per-record representation sent to the search engine.
pub type Document = Map<String, Value>;

/// Project one record into a [`Document`] according to `fields`.
///
/// Resolution per descriptor: the named attribute first, then a
/// same-named computed accessor when the attribute is absent or null.
/// Whatever resolves (or null, if nothing does) is emitted under the
/// descriptor's name; no descriptor is dropped. Date/time values become
/// epoch seconds regardless of the declared field type, and a descriptor
/// named `id` (case-insensitive) always forces `doc["id"]` to the
/// record's primary key rendered as a string.
#[must_use]
pub fn map_record(record: &dyn Record, fields: &[FieldSpec]) -> Document {
    if let Some(doc) = record.search_document() {
        return doc;
    }

    let mut doc = Document::new();
    for field in fields {
        let name = &field.name;
        let mut value = record.attr(name);
        let absent = matches!(value, None | Some(AttrValue::Value(Value::Null)));
        if absent {
            if let Some(computed) = record.call(name) {
                value = Some(computed);
            }
        }
        doc.insert(
            name.clone(),
            value.map_or(Value::Null, AttrValue::into_value),
        );
        if name.eq_ignore_ascii_case("id") {
            doc.insert("id".to_string(), Value::from(record.id().to_string()));
        }
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::collections::HashMap;

    struct TestRecord {
        id: i64,
        attrs: HashMap<String, AttrValue>,
        computed: HashMap<String, AttrValue>,
        own_document: Option<Document>,
    }

    impl TestRecord {
        fn new(id: i64) -> Self {
            Self {
                id,
                attrs: HashMap::new(),
                computed: HashMap::new(),
                own_document: None,
            }
        }

        fn with_attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
            self.attrs.insert(name.to_string(), value.into());
            self
        }

        fn with_computed(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
            self.computed.insert(name.to_string(), value.into());
            self
        }
    }

    impl Record for TestRecord {
        fn id(&self) -> i64 {
            self.id
        }
        fn class_name(&self) -> &str {
            "Page"
        }
        fn attr(&self, name: &str) -> Option<AttrValue> {
            self.attrs.get(name).cloned()
        }
        fn call(&self, name: &str) -> Option<AttrValue> {
            self.computed.get(name).cloned()
        }
        fn search_document(&self) -> Option<Document> {
            self.own_document.clone()
        }
    }

    fn descriptor(name: &str) -> FieldSpec {
        FieldSpec {
            name: name.to_string(),
            field_type: FieldType::String,
            facet: false,
            optional: false,
            index: true,
            sort: false,
            store: true,
            infix: false,
            stem: false,
        }
    }

    #[test]
    fn test_maps_named_attributes() {
        let record = TestRecord::new(1).with_attr("Title", "Home");
        let doc = map_record(&record, &[descriptor("Title")]);
        assert_eq!(doc["Title"], json!("Home"));
    }

    #[test]
    fn test_id_forced_to_primary_key_string() {
        // The record's own "id" attribute is overridden by the primary key
        let record = TestRecord::new(42).with_attr("id", "not-the-pk");
        let doc = map_record(&record, &[descriptor("id")]);
        assert_eq!(doc["id"], json!("42"));
    }

    #[test]
    fn test_id_forcing_is_case_insensitive() {
        let record = TestRecord::new(9);
        let doc = map_record(&record, &[descriptor("ID")]);
        assert_eq!(doc["id"], json!("9"));
        // The descriptor's own spelling is emitted too
        assert!(doc.contains_key("ID"));
    }

    #[test]
    fn test_computed_fallback_when_attribute_absent() {
        let record = TestRecord::new(1).with_computed("Summary", "generated");
        let doc = map_record(&record, &[descriptor("Summary")]);
        assert_eq!(doc["Summary"], json!("generated"));
    }

    #[test]
    fn test_attribute_wins_over_computed() {
        let record = TestRecord::new(1)
            .with_attr("Summary", "stored")
            .with_computed("Summary", "generated");
        let doc = map_record(&record, &[descriptor("Summary")]);
        assert_eq!(doc["Summary"], json!("stored"));
    }

    #[test]
    fn test_null_attribute_falls_back_to_computed() {
        let record = TestRecord::new(1)
            .with_attr("Summary", AttrValue::Value(Value::Null))
            .with_computed("Summary", "generated");
        let doc = map_record(&record, &[descriptor("Summary")]);
        assert_eq!(doc["Summary"], json!("generated"));
    }

    #[test]
    fn test_missing_descriptor_emitted_as_null() {
        let record = TestRecord::new(1);
        let doc = map_record(&record, &[descriptor("Nope")]);
        assert_eq!(doc["Nope"], Value::Null);
    }

    #[test]
    fn test_datetime_becomes_epoch_seconds() {
        let dt = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let record = TestRecord::new(1).with_attr("last_edited", dt);
        let doc = map_record(&record, &[descriptor("last_edited")]);
        assert_eq!(doc["last_edited"], json!(dt.timestamp()));
    }

    #[test]
    fn test_record_override_takes_full_precedence() {
        let mut own = Document::new();
        own.insert("custom".to_string(), json!(true));
        let mut record = TestRecord::new(1).with_attr("Title", "ignored");
        record.own_document = Some(own);

        let doc = map_record(&record, &[descriptor("Title")]);
        assert_eq!(doc.len(), 1);
        assert_eq!(doc["custom"], json!(true));
    }
}
