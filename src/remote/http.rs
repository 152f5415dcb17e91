// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! HTTP client for the search server's REST API.
//!
//! Targets a single node described by the configured `scheme://host:port`
//! URI plus an API key header. Collection lifecycle uses the collections
//! endpoints; bulk import posts JSONL to the documents import endpoint and
//! reads one result object back per line.
//!
//! The client is cheap to construct: the importer builds a fresh one per
//! collection so each collection's connection timeout applies to its own
//! calls.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use crate::config::ServerConfig;
use crate::document::Document;
use crate::schema::CollectionSchema;

use super::traits::{
    DocumentOutcome, ImportMode, ImportReport, IndexError, RemoteIndex, RemoteIndexProvider,
};

const API_KEY_HEADER: &str = "x-typesense-api-key";

#[derive(Debug)]
pub struct HttpIndex {
    base: String,
    api_key: String,
    http: reqwest::Client,
}

impl HttpIndex {
    /// Build a client bound to `timeout_secs`.
    ///
    /// A missing or malformed node URI is a configuration error raised
    /// here, before any work happens.
    pub fn new(server: &ServerConfig, timeout_secs: u64) -> Result<Self, IndexError> {
        let node = server.node()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .map_err(|e| IndexError::Transport(e.to_string()))?;
        Ok(Self {
            base: format!("{}://{}:{}", node.scheme, node.host, node.port),
            api_key: server.api_key.clone(),
            http,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base, path))
            .header(API_KEY_HEADER, &self.api_key)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, IndexError> {
        builder
            .send()
            .await
            .map_err(|e| IndexError::Transport(e.to_string()))
    }
}

/// Map a non-success response onto the error taxonomy.
async fn response_error(resp: Response, subject: &str) -> IndexError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    match status {
        StatusCode::CONFLICT => IndexError::AlreadyExists(subject.to_string()),
        StatusCode::NOT_FOUND => IndexError::NotFound(subject.to_string()),
        StatusCode::BAD_REQUEST => IndexError::RequestMalformed(body),
        _ => IndexError::Transport(format!("{subject}: HTTP {status}: {body}")),
    }
}

#[derive(Deserialize)]
struct ImportLine {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Parse the JSONL import response body: one result object per document,
/// in submission order. An unparseable line counts as a failure rather
/// than aborting the whole report.
fn parse_import_report(body: &str) -> ImportReport {
    let outcomes = body
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| match serde_json::from_str::<ImportLine>(line) {
            Ok(parsed) => DocumentOutcome {
                success: parsed.success,
                error: parsed.error,
            },
            Err(e) => DocumentOutcome {
                success: false,
                error: Some(format!("unparseable import result: {e}")),
            },
        })
        .collect();
    ImportReport { outcomes }
}

#[async_trait]
impl RemoteIndex for HttpIndex {
    async fn exists(&self, name: &str) -> Result<bool, IndexError> {
        let resp = self
            .send(self.request(Method::GET, &format!("/collections/{name}")))
            .await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            _ => Err(response_error(resp, name).await),
        }
    }

    async fn create(&self, schema: &CollectionSchema) -> Result<(), IndexError> {
        let resp = self
            .send(self.request(Method::POST, "/collections").json(schema))
            .await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(response_error(resp, &schema.name).await)
        }
    }

    async fn delete(&self, name: &str) -> Result<(), IndexError> {
        let resp = self
            .send(self.request(Method::DELETE, &format!("/collections/{name}")))
            .await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(response_error(resp, name).await)
        }
    }

    async fn upsert_document(&self, collection: &str, doc: &Document) -> Result<(), IndexError> {
        let resp = self
            .send(
                self.request(
                    Method::POST,
                    &format!("/collections/{collection}/documents?action=upsert"),
                )
                .json(doc),
            )
            .await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(response_error(resp, collection).await)
        }
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), IndexError> {
        let resp = self
            .send(self.request(
                Method::DELETE,
                &format!("/collections/{collection}/documents/{id}"),
            ))
            .await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(response_error(resp, id).await)
        }
    }

    async fn bulk_import(
        &self,
        collection: &str,
        docs: &[Document],
        mode: ImportMode,
    ) -> Result<ImportReport, IndexError> {
        let mut body = String::new();
        for doc in docs {
            let line = serde_json::to_string(doc)
                .map_err(|e| IndexError::RequestMalformed(e.to_string()))?;
            body.push_str(&line);
            body.push('\n');
        }

        let resp = self
            .send(
                self.request(
                    Method::POST,
                    &format!(
                        "/collections/{collection}/documents/import?action={}",
                        mode.wire_name()
                    ),
                )
                .header("content-type", "text/plain")
                .body(body),
            )
            .await?;

        if resp.status().is_success() {
            let body = resp
                .text()
                .await
                .map_err(|e| IndexError::Transport(e.to_string()))?;
            Ok(parse_import_report(&body))
        } else {
            Err(response_error(resp, collection).await)
        }
    }
}

/// Opens [`HttpIndex`] clients against one configured server.
pub struct HttpProvider {
    server: ServerConfig,
}

impl HttpProvider {
    #[must_use]
    pub fn new(server: ServerConfig) -> Self {
        Self { server }
    }
}

impl RemoteIndexProvider for HttpProvider {
    fn open(&self, timeout_secs: u64) -> Result<Arc<dyn RemoteIndex>, IndexError> {
        Ok(Arc::new(HttpIndex::new(&self.server, timeout_secs)?))
    }
}
