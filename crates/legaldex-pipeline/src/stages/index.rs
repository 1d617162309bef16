// SPDX-License-Identifier: MIT OR Apache-2.0
//! The `Index` stage (§4.5): persists the assembled document to the search
//! engine. Always recoverable — a failure here is recorded on
//! [`PipelineContext::index_error`] but never aborts the pipeline, and
//! storage success from the `Store` stage (if it ran) is preserved either
//! way.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use legaldex_ports::SearchEngine;

use crate::assemble::assemble_document;
use crate::context::PipelineContext;
use crate::stage::{Processor, StageKind, StageOutcome};

/// Indexes the document assembled by `Store` (or, if `Store` did not run or
/// failed, assembles one itself with an empty synthetic storage path).
pub struct IndexProcessor {
    engine: Arc<dyn SearchEngine>,
    default_legal_category: String,
}

impl IndexProcessor {
    /// Build a processor over a shared search engine.
    #[must_use]
    pub fn new(engine: Arc<dyn SearchEngine>, default_legal_category: impl Into<String>) -> Self {
        Self { engine, default_legal_category: default_legal_category.into() }
    }
}

#[async_trait]
impl Processor for IndexProcessor {
    fn kind(&self) -> StageKind {
        StageKind::Index
    }

    async fn process(&self, ctx: &mut PipelineContext) -> StageOutcome {
        if !ctx.request.options.update_index {
            return StageOutcome::Success;
        }

        if !ctx.classification_applied && !ctx.request.options.force_index {
            ctx.index_error = Some("classification unavailable and force_index not set; indexing skipped".to_string());
            return StageOutcome::Success;
        }

        let now = Utc::now();
        // Always assembled fresh rather than reused from `ctx.document`: when
        // `Store` runs concurrently with `Index` (§4.5), `Index` never
        // observes `Store`'s real path, so it indexes under a synthetic one
        // (the engine prefers `Store`'s document when merging the two
        // afterwards).
        let document = assemble_document(ctx, &self.default_legal_category, String::new(), None, now);

        match self.engine.index(&document).await {
            Ok(id) => {
                if ctx.document.is_none() {
                    ctx.document = Some(document);
                }
                ctx.index_id = Some(id);
                ctx.index_error = None;
                StageOutcome::Success
            }
            Err(err) => {
                ctx.index_error = Some(err.to_string());
                StageOutcome::Degraded { reason: err.to_string() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use legaldex_ports::InMemorySearchEngine;

    use crate::context::{IngestOptions, IngestRequest};

    use super::*;

    fn ctx(update_index: bool, force_index: bool, classification_applied: bool) -> PipelineContext {
        let request = IngestRequest {
            id: Some("doc-1".to_string()),
            original_file_name: "Motion.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: b"bytes".to_vec(),
            options: IngestOptions { update_index, force_index, ..IngestOptions::default() },
        };
        let mut context = PipelineContext::new(request, Duration::from_secs(30));
        context.document_id = Some("doc-1".to_string());
        context.classification_applied = classification_applied;
        context
    }

    #[tokio::test]
    async fn update_index_false_skips_entirely() {
        let processor = IndexProcessor::new(Arc::new(InMemorySearchEngine::new()), "Civil");
        let mut context = ctx(false, false, true);
        let outcome = processor.process(&mut context).await;
        assert!(matches!(outcome, StageOutcome::Success));
        assert!(context.index_id.is_none());
    }

    #[tokio::test]
    async fn classification_missing_without_force_index_skips_indexing() {
        let processor = IndexProcessor::new(Arc::new(InMemorySearchEngine::new()), "Civil");
        let mut context = ctx(true, false, false);
        let outcome = processor.process(&mut context).await;
        assert!(matches!(outcome, StageOutcome::Success));
        assert!(context.index_id.is_none());
        assert!(context.index_error.is_some());
    }

    #[tokio::test]
    async fn force_index_indexes_despite_missing_classification() {
        let processor = IndexProcessor::new(Arc::new(InMemorySearchEngine::new()), "Civil");
        let mut context = ctx(true, true, false);
        let outcome = processor.process(&mut context).await;
        assert!(matches!(outcome, StageOutcome::Success));
        assert!(context.index_id.is_some());
    }
}
