// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]
//! External-capability traits consumed by the pipeline and query layers
//! (§6): the Object Store and Search Engine. Both are out-of-scope
//! collaborators — this crate only defines the boundary and ships
//! in-memory test doubles, never a production implementation.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use legaldex_core::{Document, ErrorKind};
use serde_json::Value;
use tracing::debug;

/// Errors raised by an [`ObjectStore`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum ObjectStoreError {
    /// No object exists at the requested path.
    #[error("object not found: {path}")]
    NotFound {
        /// Path that was requested.
        path: String,
    },
    /// The underlying store rejected the operation.
    #[error("object store I/O failed: {reason}")]
    Io {
        /// Human-readable cause.
        reason: String,
    },
}

impl ObjectStoreError {
    /// Maps onto [`ErrorKind::NotFound`]/[`ErrorKind::Storage`] (§7).
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Io { .. } => ErrorKind::Storage,
        }
    }
}

/// Result of a successful [`ObjectStore::put`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOutcome {
    /// Public URL of the stored object, if the store assigns one eagerly.
    pub url: Option<String>,
    /// Opaque version/integrity tag (e.g. an ETag).
    pub etag: String,
    /// Size of the stored blob, in bytes.
    pub size: u64,
}

/// Result of a successful [`ObjectStore::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOutcome {
    /// Matching object paths under the requested prefix.
    pub entries: Vec<String>,
    /// Opaque cursor to continue listing, if more entries remain.
    pub next_cursor: Option<String>,
}

/// The blob-storage capability (§6 "Object Store capability").
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` at `path`, attaching `metadata` as store-level tags.
    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        metadata: &BTreeMap<String, String>,
    ) -> Result<PutOutcome, ObjectStoreError>;

    /// Fetch the bytes stored at `path`.
    async fn get(&self, path: &str) -> Result<Vec<u8>, ObjectStoreError>;

    /// Remove the object at `path`. Removing a path that does not exist is
    /// not an error.
    async fn delete(&self, path: &str) -> Result<(), ObjectStoreError>;

    /// Whether an object exists at `path`.
    async fn exists(&self, path: &str) -> Result<bool, ObjectStoreError>;

    /// The object's public URL, if the store serves one without signing.
    async fn url(&self, path: &str) -> Result<Option<String>, ObjectStoreError>;

    /// A time-limited signed URL, valid for `ttl_secs` seconds.
    async fn signed_url(&self, path: &str, ttl_secs: u64) -> Result<String, ObjectStoreError>;

    /// List object paths under `prefix`, paginated by an opaque cursor.
    async fn list(
        &self,
        prefix: &str,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<ListOutcome, ObjectStoreError>;

    /// Whether the store is currently reachable and accepting requests.
    async fn is_healthy(&self) -> bool;
}

/// Errors raised by a [`SearchEngine`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum SearchEngineError {
    /// No document exists with the requested id.
    #[error("document not found: {id}")]
    NotFound {
        /// Id that was requested.
        id: String,
    },
    /// The engine rejected the request for a transient reason (safe to
    /// retry).
    #[error("search engine rejected request (transient): {reason}")]
    Transient {
        /// Human-readable cause.
        reason: String,
    },
    /// The engine rejected the request for a permanent reason (e.g. a
    /// mapping conflict); retrying will not help.
    #[error("search engine rejected request (permanent): {reason}")]
    Permanent {
        /// Human-readable cause.
        reason: String,
    },
}

impl SearchEngineError {
    /// Maps onto [`ErrorKind::NotFound`]/[`ErrorKind::Index`] (§7).
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Transient { .. } | Self::Permanent { .. } => ErrorKind::Index,
        }
    }
}

/// Result of a successful [`SearchEngine::search`].
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Matching documents, in engine-determined order.
    pub hits: Vec<Document>,
    /// Total number of matches before pagination was applied.
    pub total_hits: u64,
    /// Raw aggregation bodies requested alongside the query, if any.
    pub aggregations: Value,
    /// Engine-reported query duration, in milliseconds.
    pub took_ms: u64,
    /// Whether the engine gave up before completing the query.
    pub timed_out: bool,
}

/// Reported engine health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// Engine is reachable and serving traffic normally.
    Green,
    /// Engine is reachable but degraded.
    Yellow,
    /// Engine is unreachable or refusing requests.
    Red,
}

/// The full-text/structured search capability (§6 "Search Engine
/// capability").
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Index a new document, returning its engine-assigned id.
    async fn index(&self, document: &Document) -> Result<String, SearchEngineError>;

    /// Replace the document stored under `id`.
    async fn update(&self, id: &str, document: &Document) -> Result<(), SearchEngineError>;

    /// Remove the document stored under `id`.
    async fn delete(&self, id: &str) -> Result<(), SearchEngineError>;

    /// Fetch the document stored under `id`.
    async fn get(&self, id: &str) -> Result<Document, SearchEngineError>;

    /// Execute a pre-built query body (as produced by `legaldex-query`).
    async fn search(&self, query_body: &Value) -> Result<SearchOutcome, SearchEngineError>;

    /// Execute a pre-built aggregation body (as produced by
    /// `legaldex-aggregate`), returning the raw aggregation response.
    async fn aggregate(&self, agg_body: &Value) -> Result<Value, SearchEngineError>;

    /// Create the backing index with the given mapping body.
    async fn create_index(&self, mapping: &Value) -> Result<(), SearchEngineError>;

    /// Delete the backing index entirely.
    async fn delete_index(&self) -> Result<(), SearchEngineError>;

    /// Force a refresh so recently-indexed documents become searchable.
    async fn refresh_index(&self) -> Result<(), SearchEngineError>;

    /// Current engine health.
    async fn health(&self) -> HealthStatus;
}

// ---------------------------------------------------------------------------
// In-memory test doubles (teacher's `abp-backend-mock` idiom). Never used
// by a production code path — integration tests only.
// ---------------------------------------------------------------------------

/// An in-memory [`ObjectStore`] test double.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryObjectStore {
    /// Build an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        _metadata: &BTreeMap<String, String>,
    ) -> Result<PutOutcome, ObjectStoreError> {
        let mut objects = self.objects.lock().expect("in-memory object store mutex poisoned");
        objects.insert(path.to_string(), bytes.to_vec());
        debug!(target: "legaldex.ports", path, size = bytes.len(), "put object");
        Ok(PutOutcome {
            url: Some(format!("mem://{path}")),
            etag: legaldex_core::compute_text_hash(&String::from_utf8_lossy(bytes)),
            size: bytes.len() as u64,
        })
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, ObjectStoreError> {
        let objects = self.objects.lock().expect("in-memory object store mutex poisoned");
        objects
            .get(path)
            .cloned()
            .ok_or_else(|| ObjectStoreError::NotFound { path: path.to_string() })
    }

    async fn delete(&self, path: &str) -> Result<(), ObjectStoreError> {
        let mut objects = self.objects.lock().expect("in-memory object store mutex poisoned");
        objects.remove(path);
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool, ObjectStoreError> {
        let objects = self.objects.lock().expect("in-memory object store mutex poisoned");
        Ok(objects.contains_key(path))
    }

    async fn url(&self, path: &str) -> Result<Option<String>, ObjectStoreError> {
        Ok(Some(format!("mem://{path}")))
    }

    async fn signed_url(&self, path: &str, ttl_secs: u64) -> Result<String, ObjectStoreError> {
        Ok(format!("mem://{path}?ttl={ttl_secs}"))
    }

    async fn list(
        &self,
        prefix: &str,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<ListOutcome, ObjectStoreError> {
        let objects = self.objects.lock().expect("in-memory object store mutex poisoned");
        let mut matching: Vec<&String> = objects.keys().filter(|k| k.starts_with(prefix)).collect();
        matching.sort();
        let start = cursor.and_then(|c| matching.iter().position(|k| k.as_str() == c).map(|i| i + 1)).unwrap_or(0);
        let page: Vec<String> = matching.iter().skip(start).take(limit).map(|s| (*s).clone()).collect();
        let next_cursor = if start + page.len() < matching.len() { page.last().cloned() } else { None };
        Ok(ListOutcome { entries: page, next_cursor })
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}

/// An in-memory [`SearchEngine`] test double. `search` performs a naive
/// substring match against `Document::text` keyed by the body's `"q"`
/// field, honouring `"from"`/`"size"` when present — enough to exercise
/// round-trip query-builder tests without a real engine.
#[derive(Default)]
pub struct InMemorySearchEngine {
    documents: Mutex<BTreeMap<String, Document>>,
}

impl InMemorySearchEngine {
    /// Build an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SearchEngine for InMemorySearchEngine {
    async fn index(&self, document: &Document) -> Result<String, SearchEngineError> {
        let mut documents = self.documents.lock().expect("in-memory search engine mutex poisoned");
        documents.insert(document.id.clone(), document.clone());
        Ok(document.id.clone())
    }

    async fn update(&self, id: &str, document: &Document) -> Result<(), SearchEngineError> {
        let mut documents = self.documents.lock().expect("in-memory search engine mutex poisoned");
        if !documents.contains_key(id) {
            return Err(SearchEngineError::NotFound { id: id.to_string() });
        }
        documents.insert(id.to_string(), document.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), SearchEngineError> {
        let mut documents = self.documents.lock().expect("in-memory search engine mutex poisoned");
        documents.remove(id);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Document, SearchEngineError> {
        let documents = self.documents.lock().expect("in-memory search engine mutex poisoned");
        documents.get(id).cloned().ok_or_else(|| SearchEngineError::NotFound { id: id.to_string() })
    }

    async fn search(&self, query_body: &Value) -> Result<SearchOutcome, SearchEngineError> {
        let documents = self.documents.lock().expect("in-memory search engine mutex poisoned");
        let needle = query_body.get("q").and_then(Value::as_str).map(str::to_lowercase);
        let mut matches: Vec<&Document> = documents
            .values()
            .filter(|doc| {
                needle
                    .as_ref()
                    .is_none_or(|q| q.is_empty() || doc.text.to_lowercase().contains(q))
            })
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));

        let total_hits = matches.len() as u64;
        let from = query_body.get("from").and_then(Value::as_u64).unwrap_or(0) as usize;
        let size = query_body.get("size").and_then(Value::as_u64).unwrap_or(total_hits) as usize;
        let page: Vec<Document> = matches.drain(..).skip(from).take(size.max(1)).cloned().collect();

        Ok(SearchOutcome {
            hits: page,
            total_hits,
            aggregations: Value::Null,
            took_ms: 0,
            timed_out: false,
        })
    }

    async fn aggregate(&self, _agg_body: &Value) -> Result<Value, SearchEngineError> {
        Ok(Value::Object(serde_json::Map::new()))
    }

    async fn create_index(&self, _mapping: &Value) -> Result<(), SearchEngineError> {
        Ok(())
    }

    async fn delete_index(&self) -> Result<(), SearchEngineError> {
        let mut documents = self.documents.lock().expect("in-memory search engine mutex poisoned");
        documents.clear();
        Ok(())
    }

    async fn refresh_index(&self) -> Result<(), SearchEngineError> {
        Ok(())
    }

    async fn health(&self) -> HealthStatus {
        HealthStatus::Green
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn object_store_round_trips_put_get() {
        let store = InMemoryObjectStore::new();
        let meta = BTreeMap::new();
        store.put("documents/2024/01/a/file.txt", b"hello", &meta).await.unwrap();
        let bytes = store.get("documents/2024/01/a/file.txt").await.unwrap();
        assert_eq!(bytes, b"hello");
        assert!(store.exists("documents/2024/01/a/file.txt").await.unwrap());
    }

    #[tokio::test]
    async fn object_store_get_missing_is_not_found() {
        let store = InMemoryObjectStore::new();
        let err = store.get("missing").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn object_store_list_respects_prefix_and_pagination() {
        let store = InMemoryObjectStore::new();
        let meta = BTreeMap::new();
        for i in 0..5 {
            store.put(&format!("docs/{i}"), b"x", &meta).await.unwrap();
        }
        store.put("other/1", b"x", &meta).await.unwrap();
        let page = store.list("docs/", None, 2).await.unwrap();
        assert_eq!(page.entries.len(), 2);
        assert!(page.next_cursor.is_some());
    }

    fn sample_document(id: &str, text: &str) -> Document {
        use chrono::Utc;
        Document {
            id: id.to_string(),
            original_file_name: "f.txt".to_string(),
            storage_path: format!("documents/2024/01/{id}/f.txt"),
            url: None,
            text: text.to_string(),
            content_type: "text/plain".to_string(),
            size: text.len() as u64,
            hash: legaldex_core::compute_text_hash(text),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            document_type: legaldex_core::DocumentType::Other,
            legal_category: "Civil".to_string(),
            metadata: legaldex_core::DocumentMetadata::default(),
        }
    }

    #[tokio::test]
    async fn search_engine_round_trips_index_get() {
        let engine = InMemorySearchEngine::new();
        let doc = sample_document("d1", "motion to dismiss");
        engine.index(&doc).await.unwrap();
        let fetched = engine.get("d1").await.unwrap();
        assert_eq!(fetched.id, "d1");
    }

    #[tokio::test]
    async fn search_engine_filters_by_text_substring() {
        let engine = InMemorySearchEngine::new();
        engine.index(&sample_document("d1", "motion to dismiss")).await.unwrap();
        engine.index(&sample_document("d2", "notice of deposition")).await.unwrap();

        let result = engine.search(&serde_json::json!({"q": "motion"})).await.unwrap();
        assert_eq!(result.total_hits, 1);
        assert_eq!(result.hits[0].id, "d1");
    }

    #[tokio::test]
    async fn search_engine_update_requires_existing_id() {
        let engine = InMemorySearchEngine::new();
        let err = engine.update("missing", &sample_document("missing", "x")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
