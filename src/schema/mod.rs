// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Collection and field schema model.
//!
//! A [`Collection`] describes one remote search index: its name, the record
//! class it is fed from, import tuning, and an owned set of [`Field`]s. The
//! model is pure data plus the validation/normalization rules the search
//! server expects; persistence lives in [`store::SchemaStore`].
//!
//! # Field normalization
//!
//! Three rules are applied silently on every persist (everything else is a
//! hard validation error):
//!
//! - `facet = true` forces `optional = true`
//! - type `auto` forces `sort = false`
//! - types `string[]` and `string*` force `sort = false`
//!
//! # Example
//!
//! ```
//! use index_sync::schema::{Field, FieldSpec, FieldType};
//!
//! let spec: FieldSpec = serde_json::from_str(
//!     r#"{ "name": "Tags", "type": "string[]", "facet": true, "sort": true }"#
//! ).unwrap();
//! let field = Field::from_spec(&spec);
//!
//! assert!(field.optional);  // forced by facet
//! assert!(!field.sort);     // string[] is never sortable
//! ```

pub mod store;

pub use store::SchemaStore;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::CollectionSpec;

/// Store-assigned collection identifier.
pub type CollectionId = u64;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("collection name must not be empty")]
    EmptyName,
    #[error("record class '{0}' is not a known record type")]
    UnknownRecordClass(String),
    #[error("default sorting field '{field}' is not a field of collection '{collection}'")]
    UnknownSortingField { collection: String, field: String },
    #[error("default sorting field '{field}' cannot be an '{ty}' field")]
    UnsortableSortingField { field: String, ty: FieldType },
}

/// The fixed set of field types the search server understands.
///
/// Wire spellings are lowercase with `[]` marking array variants;
/// `string*` auto-coerces to string-or-string-array and `auto` infers the
/// type from indexed documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "string[]")]
    StringArray,
    #[serde(rename = "int32")]
    Int32,
    #[serde(rename = "int32[]")]
    Int32Array,
    #[serde(rename = "int64")]
    Int64,
    #[serde(rename = "int64[]")]
    Int64Array,
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "float[]")]
    FloatArray,
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "bool[]")]
    BoolArray,
    #[serde(rename = "geopoint")]
    Geopoint,
    #[serde(rename = "geopoint[]")]
    GeopointArray,
    #[serde(rename = "object")]
    Object,
    #[serde(rename = "object[]")]
    ObjectArray,
    #[serde(rename = "string*")]
    AutoString,
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "auto")]
    #[default]
    Auto,
}

impl FieldType {
    /// Every member of the enumeration, in wire order.
    pub const ALL: [FieldType; 17] = [
        FieldType::String,
        FieldType::StringArray,
        FieldType::Int32,
        FieldType::Int32Array,
        FieldType::Int64,
        FieldType::Int64Array,
        FieldType::Float,
        FieldType::FloatArray,
        FieldType::Bool,
        FieldType::BoolArray,
        FieldType::Geopoint,
        FieldType::GeopointArray,
        FieldType::Object,
        FieldType::ObjectArray,
        FieldType::AutoString,
        FieldType::Image,
        FieldType::Auto,
    ];

    /// Wire spelling of this type.
    #[must_use]
    pub fn wire_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::StringArray => "string[]",
            FieldType::Int32 => "int32",
            FieldType::Int32Array => "int32[]",
            FieldType::Int64 => "int64",
            FieldType::Int64Array => "int64[]",
            FieldType::Float => "float",
            FieldType::FloatArray => "float[]",
            FieldType::Bool => "bool",
            FieldType::BoolArray => "bool[]",
            FieldType::Geopoint => "geopoint",
            FieldType::GeopointArray => "geopoint[]",
            FieldType::Object => "object",
            FieldType::ObjectArray => "object[]",
            FieldType::AutoString => "string*",
            FieldType::Image => "image",
            FieldType::Auto => "auto",
        }
    }

    /// Whether a field of this type may carry `sort = true`.
    #[must_use]
    pub fn sortable(&self) -> bool {
        !matches!(
            self,
            FieldType::StringArray | FieldType::AutoString | FieldType::Auto
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// One field descriptor, both as accepted from configuration and as sent
/// to the remote server inside a collection schema.
///
/// `name` and `type` default to the wildcard matcher and `auto` when left
/// unset; `index` and `store` default on, everything else off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub facet: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default = "default_true")]
    pub index: bool,
    #[serde(default)]
    pub sort: bool,
    #[serde(default = "default_true")]
    pub store: bool,
    #[serde(default)]
    pub infix: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub stem: bool,
}

impl FieldSpec {
    /// Descriptor for one of the implicit attributes appended to every
    /// schema (`id`, `class_name`, `last_edited`, `created`).
    fn implicit(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            facet: false,
            optional: false,
            index: true,
            sort: false,
            store: true,
            infix: false,
            stem: false,
        }
    }
}

fn default_true() -> bool {
    true
}
fn is_false(b: &bool) -> bool {
    !*b
}

/// One schema attribute of a [`Collection`], normalized for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    pub facet: bool,
    pub optional: bool,
    pub index: bool,
    pub sort: bool,
    pub store: bool,
    pub infix: bool,
    pub stem: bool,
}

impl Field {
    /// Build a normalized field from a configuration descriptor.
    #[must_use]
    pub fn from_spec(spec: &FieldSpec) -> Self {
        let mut field = Self {
            name: spec.name.clone(),
            field_type: spec.field_type,
            facet: spec.facet,
            optional: spec.optional,
            index: spec.index,
            sort: spec.sort,
            store: spec.store,
            infix: spec.infix,
            stem: spec.stem,
        };
        field.normalize();
        field
    }

    /// Apply the silent coercion rules. Idempotent; runs on every persist.
    pub fn normalize(&mut self) {
        if self.facet {
            self.optional = true;
        }
        if !self.field_type.sortable() {
            self.sort = false;
        }
    }

    /// Wire descriptor for this field. An unset name becomes the wildcard
    /// matcher `.*`.
    #[must_use]
    pub fn descriptor(&self) -> FieldSpec {
        FieldSpec {
            name: if self.name.is_empty() {
                ".*".to_string()
            } else {
                self.name.clone()
            },
            field_type: self.field_type,
            facet: self.facet,
            optional: self.optional,
            index: self.index,
            sort: self.sort,
            store: self.store,
            infix: self.infix,
            stem: self.stem,
        }
    }
}

/// One search index plus its import configuration.
///
/// Fields are owned by the [`store::SchemaStore`] arena keyed by this
/// collection's id; they are attached via find-or-create and removed only
/// by the cascade when the collection itself is deleted.
#[derive(Debug, Clone)]
pub struct Collection {
    pub id: CollectionId,
    /// Unique, stable identifier on the remote server
    pub name: String,
    pub default_sorting_field: Option<String>,
    pub token_separators: Option<String>,
    pub symbols_to_index: Option<String>,
    /// Host record class this collection indexes. First write wins; the
    /// binding never changes across resyncs.
    pub record_class: String,
    pub enabled: bool,
    /// Documents per bulk-import call, clamped to >= 1 on persist
    pub import_batch_size: u32,
    /// Connection timeout in seconds, clamped to >= 1 on persist
    pub connection_timeout_secs: u64,
    /// Record subtypes excluded from the import scan (stored lowercased)
    pub excluded_classes: Vec<String>,
    /// Ascending orchestration order
    pub rank: i32,
}

impl Collection {
    /// Overwrite the descriptive schema values from configuration.
    ///
    /// The record-class binding is deliberately not touched here;
    /// configuration is the source of truth for schema shape only.
    /// Limits are clamped to their minimums.
    pub fn apply_spec(&mut self, spec: &CollectionSpec) {
        self.default_sorting_field = spec
            .default_sorting_field
            .clone()
            .filter(|f| !f.is_empty());
        self.token_separators = spec.token_separators.clone().filter(|s| !s.is_empty());
        self.symbols_to_index = spec.symbols_to_index.clone().filter(|s| !s.is_empty());
        self.import_batch_size = spec.import_limit.clamp(1, i64::from(u32::MAX)) as u32;
        self.connection_timeout_secs = spec.connection_timeout.max(1) as u64;
        self.excluded_classes = spec
            .excluded_classes
            .iter()
            .map(|c| c.to_lowercase())
            .collect();
    }

    /// Ordered wire descriptors for this collection: one per attached
    /// field, followed by the four implicit attributes every document
    /// carries.
    #[must_use]
    pub fn fields_array(&self, fields: &[Field]) -> Vec<FieldSpec> {
        let mut arr: Vec<FieldSpec> = fields.iter().map(Field::descriptor).collect();
        arr.push(FieldSpec::implicit("id", FieldType::Int64));
        arr.push(FieldSpec::implicit("class_name", FieldType::String));
        arr.push(FieldSpec::implicit("last_edited", FieldType::Int64));
        arr.push(FieldSpec::implicit("created", FieldType::Int64));
        arr
    }

    /// Build the desired remote schema for this collection.
    #[must_use]
    pub fn schema(&self, fields: &[Field]) -> CollectionSchema {
        CollectionSchema {
            name: self.name.clone(),
            enable_nested_fields: true,
            fields: self.fields_array(fields),
            default_sorting_field: self.default_sorting_field.clone(),
            token_separators: self.token_separators.as_deref().map(split_chars),
            symbols_to_index: self.symbols_to_index.as_deref().map(split_chars),
        }
    }
}

/// The schema object sent to the remote server when (re)creating a
/// collection.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionSchema {
    pub name: String,
    pub enable_nested_fields: bool,
    pub fields: Vec<FieldSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_sorting_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_separators: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbols_to_index: Option<Vec<String>>,
}

// The wire expects separator/symbol lists one entry per character; the
// configuration supplies them as a compact string.
fn split_chars(s: &str) -> Vec<String> {
    s.chars().map(|c| c.to_string()).collect()
}
