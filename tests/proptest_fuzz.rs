//! Property-based tests for the schema model's invariants.
//!
//! Uses proptest to push arbitrary configuration values through the
//! persist path and verify the clamping and normalization rules always
//! hold, whatever the input.
//!
//! Run with: `cargo test --test proptest_fuzz`

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;

use index_sync::{
    map_record, AttrValue, CollectionSpec, Field, FieldSpec, FieldType, Record, RecordSource,
    RecordStore, SchemaStore,
};

// =============================================================================
// Strategies
// =============================================================================

fn field_type_strategy() -> impl Strategy<Value = FieldType> {
    prop::sample::select(FieldType::ALL.to_vec())
}

fn field_spec_strategy() -> impl Strategy<Value = FieldSpec> {
    (
        "[A-Za-z][A-Za-z0-9_]{0,20}",
        field_type_strategy(),
        any::<[bool; 7]>(),
    )
        .prop_map(|(name, field_type, flags)| FieldSpec {
            name,
            field_type,
            facet: flags[0],
            optional: flags[1],
            index: flags[2],
            sort: flags[3],
            store: flags[4],
            infix: flags[5],
            stem: flags[6],
        })
}

fn collection_spec_strategy() -> impl Strategy<Value = CollectionSpec> {
    (
        any::<i64>(),
        any::<i64>(),
        prop::collection::vec(field_spec_strategy(), 0..8),
    )
        .prop_map(|(import_limit, connection_timeout, fields)| CollectionSpec {
            name: "Pages".to_string(),
            default_sorting_field: None,
            token_separators: None,
            symbols_to_index: None,
            import_limit,
            connection_timeout,
            excluded_classes: Vec::new(),
            fields,
        })
}

struct StubRecords;

impl RecordStore for StubRecords {
    fn has_type(&self, class_name: &str) -> bool {
        class_name == "Page"
    }
    fn source(&self, _class_name: &str, _excluded: &[String]) -> Option<Box<dyn RecordSource>> {
        None
    }
}

struct AttrRecord {
    id: i64,
    attrs: HashMap<String, AttrValue>,
}

impl Record for AttrRecord {
    fn id(&self) -> i64 {
        self.id
    }
    fn class_name(&self) -> &str {
        "Page"
    }
    fn attr(&self, name: &str) -> Option<AttrValue> {
        self.attrs.get(name).cloned()
    }
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// Batch size and timeout are >= 1 after every persist, whatever the
    /// configured values (including zero and negative).
    #[test]
    fn prop_limits_clamped_on_persist(spec in collection_spec_strategy()) {
        let store = SchemaStore::new(Arc::new(StubRecords));
        let collection = store.find_or_make("Pages", "Page", &spec).unwrap();

        prop_assert!(collection.import_batch_size >= 1);
        prop_assert!(collection.connection_timeout_secs >= 1);
    }

    /// Field normalization holds for arbitrary flag combinations:
    /// facet implies optional, and unsortable types never keep sort.
    #[test]
    fn prop_field_normalization_invariants(spec in field_spec_strategy()) {
        let field = Field::from_spec(&spec);

        if field.facet {
            prop_assert!(field.optional);
        }
        if matches!(
            field.field_type,
            FieldType::Auto | FieldType::StringArray | FieldType::AutoString
        ) {
            prop_assert!(!field.sort);
        }
        // Normalizing again changes nothing
        let mut again = field.clone();
        again.normalize();
        prop_assert_eq!(again, field);
    }

    /// Every field type round-trips through its wire spelling.
    #[test]
    fn prop_field_type_wire_round_trip(ty in field_type_strategy()) {
        let json = serde_json::to_string(&ty).unwrap();
        let back: FieldType = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, ty);
    }

    /// Mapping a record against a descriptor list containing "id" always
    /// yields the primary key as a string, whatever the record's own
    /// "id"-named attribute holds.
    #[test]
    fn prop_document_id_is_always_the_primary_key(
        pk in any::<i64>(),
        decoy in "[a-z0-9]{0,12}",
    ) {
        let mut attrs = HashMap::new();
        attrs.insert("id".to_string(), AttrValue::from(decoy));
        let record = AttrRecord { id: pk, attrs };

        let descriptors = vec![FieldSpec {
            name: "id".to_string(),
            field_type: FieldType::Int64,
            facet: false,
            optional: false,
            index: true,
            sort: false,
            store: true,
            infix: false,
            stem: false,
        }];
        let doc = map_record(&record, &descriptors);

        let pk_str = pk.to_string();
        prop_assert_eq!(doc["id"].as_str(), Some(pk_str.as_str()));
    }

    /// Repeated find_or_make with arbitrary specs never duplicates the
    /// collection and only ever grows its field list.
    #[test]
    fn prop_find_or_make_is_stable_under_resync(
        specs in prop::collection::vec(collection_spec_strategy(), 1..5)
    ) {
        let store = SchemaStore::new(Arc::new(StubRecords));
        let mut last_field_count = 0usize;

        for spec in &specs {
            let collection = store.find_or_make("Pages", "Page", spec).unwrap();
            let fields = store.fields_of(collection.id);
            prop_assert!(fields.len() >= last_field_count);
            last_field_count = fields.len();
        }
        prop_assert_eq!(store.len(), 1);
    }
}
