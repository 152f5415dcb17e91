// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Persistence for collections and their fields.
//!
//! Collections live in one map keyed by id; each collection's fields live
//! in a separate arena entry keyed by the owning collection id. The arena
//! makes the cascade explicit: deleting a collection drains its arena
//! entry before the collection row goes away, so no field can outlive its
//! owner.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::config::CollectionSpec;
use crate::record::RecordStore;

use super::{Collection, CollectionId, Field, SchemaError};

pub struct SchemaStore {
    records: Arc<dyn RecordStore>,
    collections: DashMap<CollectionId, Collection>,
    /// Field arena, keyed by owning collection id
    fields: DashMap<CollectionId, Vec<Field>>,
    next_id: AtomicU64,
}

impl SchemaStore {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self {
            records,
            collections: DashMap::new(),
            fields: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Find an existing collection by name or make a new one, then bring
    /// it up to date with `spec` and persist.
    ///
    /// Configuration is the source of truth for schema shape: descriptive
    /// values (sorting field, separators, symbols, limits, exclusions)
    /// are overwritten on every call. The record-class binding is the one
    /// exception: it is set only when currently unset, and only when the
    /// host knows the type (first write wins; delete the collection to
    /// rebind).
    ///
    /// Fields from `spec` are attached find-or-create, matched on every
    /// attribute plus the owning collection; previously attached fields
    /// are never removed here.
    pub fn find_or_make(
        &self,
        name: &str,
        record_class: &str,
        spec: &CollectionSpec,
    ) -> Result<Collection, SchemaError> {
        if name.is_empty() {
            return Err(SchemaError::EmptyName);
        }

        let mut collection = self.find_by_name(name).unwrap_or_else(|| {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            debug!(collection = name, id, "creating collection");
            Collection {
                id,
                name: name.to_string(),
                default_sorting_field: None,
                token_separators: None,
                symbols_to_index: None,
                record_class: String::new(),
                enabled: true,
                import_batch_size: 10_000,
                connection_timeout_secs: 2,
                excluded_classes: Vec::new(),
                rank: 0,
            }
        });

        if collection.record_class.is_empty() && self.records.has_type(record_class) {
            collection.record_class = record_class.to_string();
        }
        if collection.record_class.is_empty() || !self.records.has_type(&collection.record_class) {
            return Err(SchemaError::UnknownRecordClass(record_class.to_string()));
        }

        collection.apply_spec(spec);

        let mut fields = self
            .fields
            .get(&collection.id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        for field_spec in &spec.fields {
            let field = Field::from_spec(field_spec);
            if !fields.contains(&field) {
                fields.push(field);
            }
        }

        if let Some(sort_field) = &collection.default_sorting_field {
            let field = fields.iter().find(|f| &f.name == sort_field).ok_or_else(|| {
                SchemaError::UnknownSortingField {
                    collection: collection.name.clone(),
                    field: sort_field.clone(),
                }
            })?;
            if !field.field_type.sortable() {
                return Err(SchemaError::UnsortableSortingField {
                    field: sort_field.clone(),
                    ty: field.field_type,
                });
            }
        }

        self.fields.insert(collection.id, fields);
        self.collections.insert(collection.id, collection.clone());
        Ok(collection)
    }

    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<Collection> {
        self.collections
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value().clone())
    }

    /// Collection bound to a record class, for the incremental hook.
    #[must_use]
    pub fn find_by_record_class(&self, record_class: &str) -> Option<Collection> {
        self.collections
            .iter()
            .find(|entry| entry.record_class == record_class)
            .map(|entry| entry.value().clone())
    }

    #[must_use]
    pub fn get(&self, id: CollectionId) -> Option<Collection> {
        self.collections.get(&id).map(|entry| entry.value().clone())
    }

    /// Fields owned by a collection, in attachment order.
    #[must_use]
    pub fn fields_of(&self, id: CollectionId) -> Vec<Field> {
        self.fields
            .get(&id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Enabled collections, ascending rank (stable on id for equal ranks).
    #[must_use]
    pub fn enabled_by_rank(&self) -> Vec<Collection> {
        let mut enabled: Vec<Collection> = self
            .collections
            .iter()
            .filter(|entry| entry.enabled)
            .map(|entry| entry.value().clone())
            .collect();
        enabled.sort_by_key(|c| (c.rank, c.id));
        enabled
    }

    /// Every bound record class, for the hook's type cache.
    #[must_use]
    pub fn record_classes(&self) -> Vec<String> {
        self.collections
            .iter()
            .map(|entry| entry.record_class.clone())
            .collect()
    }

    /// Cascade-delete a collection: fields first, then the collection.
    /// Returns the removed collection so the caller can clean up the
    /// remote side.
    pub fn delete(&self, id: CollectionId) -> Option<Collection> {
        self.fields.remove(&id);
        self.collections.remove(&id).map(|(_, collection)| {
            debug!(collection = %collection.name, id, "deleted collection and its fields");
            collection
        })
    }

    pub fn set_rank(&self, id: CollectionId, rank: i32) {
        if let Some(mut entry) = self.collections.get_mut(&id) {
            entry.rank = rank;
        }
    }

    pub fn set_enabled(&self, id: CollectionId, enabled: bool) {
        if let Some(mut entry) = self.collections.get_mut(&id) {
            entry.enabled = enabled;
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}
