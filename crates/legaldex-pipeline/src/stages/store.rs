// SPDX-License-Identifier: MIT OR Apache-2.0
//! The `Store` stage (§4.5): persists the assembled document's bytes to the
//! object store. Failure here is fatal for the Store output only — it never
//! aborts the pipeline, so Index can still proceed (§4.5).

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use legaldex_core::build_storage_path;
use legaldex_ports::ObjectStore;
use serde_json::Value;

use crate::assemble::assemble_document;
use crate::context::metadata_keys;
use crate::context::PipelineContext;
use crate::stage::{Processor, StageKind, StageOutcome};

/// Writes the request's raw bytes to `storage_path` (§4.4) and records the
/// assembled [`legaldex_core::Document`] on the context.
pub struct StoreProcessor {
    store: Arc<dyn ObjectStore>,
    default_legal_category: String,
}

impl StoreProcessor {
    /// Build a processor over a shared object store.
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>, default_legal_category: impl Into<String>) -> Self {
        Self { store, default_legal_category: default_legal_category.into() }
    }
}

#[async_trait]
impl Processor for StoreProcessor {
    fn kind(&self) -> StageKind {
        StageKind::Store
    }

    async fn process(&self, ctx: &mut PipelineContext) -> StageOutcome {
        let now = Utc::now();
        let id = ctx.document_id.clone().unwrap_or_default();
        let path = build_storage_path(now, &id, &ctx.request.original_file_name);

        let mut tags = BTreeMap::new();
        tags.insert("document_id".to_string(), id.clone());

        match self.store.put(&path, &ctx.request.bytes, &tags).await {
            Ok(outcome) => {
                let url = outcome.url.or_else(|| Some(format!("store://{path}")));
                let document = assemble_document(ctx, &self.default_legal_category, path.clone(), url.clone(), now);
                ctx.document = Some(document);
                ctx.stored = true;
                ctx.metadata.insert(metadata_keys::STORAGE_PATH.to_string(), Value::String(path));
                if let Some(url) = url {
                    ctx.metadata.insert(metadata_keys::STORAGE_URL.to_string(), Value::String(url));
                }
                StageOutcome::Success
            }
            Err(err) => StageOutcome::Degraded { reason: format!("object store put failed: {err}") },
        }
    }

    fn is_healthy(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use legaldex_ports::InMemoryObjectStore;

    use crate::context::{IngestOptions, IngestRequest};

    use super::*;

    fn ctx() -> PipelineContext {
        let request = IngestRequest {
            id: Some("doc-1".to_string()),
            original_file_name: "Motion.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: b"bytes".to_vec(),
            options: IngestOptions::default(),
        };
        let mut ctx = PipelineContext::new(request, Duration::from_secs(30));
        ctx.document_id = Some("doc-1".to_string());
        ctx
    }

    #[tokio::test]
    async fn successful_put_marks_stored_and_sets_path_metadata() {
        let processor = StoreProcessor::new(Arc::new(InMemoryObjectStore::new()), "Civil");
        let mut context = ctx();
        let outcome = processor.process(&mut context).await;
        assert!(matches!(outcome, StageOutcome::Success));
        assert!(context.stored);
        assert!(context.document.is_some());
        assert!(context.metadata.contains_key(metadata_keys::STORAGE_PATH));
    }
}
