//! Configuration for the index-sync engine.
//!
//! Two halves: the remote server connection ([`ServerConfig`]) and the
//! declarative collections map ([`SyncConfig::collections`]), keyed by the
//! host record class each collection indexes.
//!
//! # Example
//!
//! ```
//! use index_sync::config::SyncConfig;
//!
//! let config: SyncConfig = serde_json::from_str(r#"{
//!     "server": { "url": "http://localhost:8108", "api_key": "xyz" },
//!     "collections": {
//!         "Page": {
//!             "name": "Pages",
//!             "fields": [
//!                 { "name": "Title", "type": "string" },
//!                 { "name": "Content", "type": "string" }
//!             ]
//!         }
//!     }
//! }"#).unwrap();
//!
//! assert_eq!(config.collections["Page"].import_limit, 10_000);
//! assert_eq!(config.collections["Page"].connection_timeout, 2);
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::schema::FieldSpec;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("server URI must be in scheme://host:port format, got '{0}'")]
    BadServerUri(String),
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),
}

/// A single parsed search-server node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

/// Remote server connection parameters.
///
/// The URI identifies a single node and must carry all of scheme, host and
/// an explicit port; anything else is a hard configuration error raised at
/// client construction.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Node URI, e.g. `http://localhost:8108`
    pub url: String,

    /// API key credential for the search server
    #[serde(default)]
    pub api_key: String,

    /// Default per-call connection timeout in seconds
    #[serde(default = "default_server_timeout")]
    pub connection_timeout_secs: u64,
}

impl ServerConfig {
    /// Load connection parameters from the process environment.
    ///
    /// Reads `INDEX_SYNC_SERVER` (required) and `INDEX_SYNC_API_KEY`
    /// (optional, defaults to empty).
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = std::env::var("INDEX_SYNC_SERVER")
            .map_err(|_| ConfigError::MissingEnv("INDEX_SYNC_SERVER"))?;
        let api_key = std::env::var("INDEX_SYNC_API_KEY").unwrap_or_default();
        Ok(Self {
            url,
            api_key,
            connection_timeout_secs: default_server_timeout(),
        })
    }

    /// Parse the configured URI into a [`Node`].
    ///
    /// Requires scheme, host and an explicit port.
    pub fn node(&self) -> Result<Node, ConfigError> {
        let parsed =
            Url::parse(&self.url).map_err(|_| ConfigError::BadServerUri(self.url.clone()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| ConfigError::BadServerUri(self.url.clone()))?;
        let port = parsed
            .port()
            .ok_or_else(|| ConfigError::BadServerUri(self.url.clone()))?;
        Ok(Node {
            scheme: parsed.scheme().to_string(),
            host: host.to_string(),
            port,
        })
    }
}

/// Declarative definition of one collection, as supplied by the host
/// application's configuration.
///
/// Numeric limits are deliberately signed: out-of-range values (zero or
/// negative) are accepted here and clamped when the schema model persists
/// them, so a bad configuration degrades instead of failing deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSpec {
    /// Collection name on the remote server
    pub name: String,

    /// Optional field used to rank results when no sort is given.
    /// Must reference a non-`auto` field of this collection.
    #[serde(default)]
    pub default_sorting_field: Option<String>,

    /// Extra word-splitting characters, one wire entry per character
    #[serde(default)]
    pub token_separators: Option<String>,

    /// Symbols to index verbatim, one wire entry per character
    #[serde(default)]
    pub symbols_to_index: Option<String>,

    /// Documents uploaded per bulk-import call
    #[serde(default = "default_import_limit")]
    pub import_limit: i64,

    /// Per-call connection timeout in seconds for this collection's import
    #[serde(default = "default_collection_timeout")]
    pub connection_timeout: i64,

    /// Record subtypes excluded from the import scan
    #[serde(default)]
    pub excluded_classes: Vec<String>,

    /// Schema fields for this collection
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

/// Top-level configuration: server connection plus the map from host
/// record class to collection definition.
///
/// A `BTreeMap` keeps iteration deterministic; run order is governed by
/// each persisted collection's rank, not by this map.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub collections: BTreeMap<String, CollectionSpec>,
}

fn default_server_timeout() -> u64 {
    2
}
fn default_import_limit() -> i64 {
    10_000
}
fn default_collection_timeout() -> i64 {
    2
}
