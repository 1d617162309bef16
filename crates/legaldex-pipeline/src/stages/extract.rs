// SPDX-License-Identifier: MIT OR Apache-2.0
//! The `Extract` stage (§4.5): runs the
//! [`legaldex_extract::enhanced::EnhancedExtractionService`] and writes its
//! output into the cross-stage metadata map.

use std::sync::Arc;

use async_trait::async_trait;
use legaldex_core::{ExtractionResult, StageError};
use legaldex_extract::enhanced::EnhancedExtractionService;
use legaldex_extract::ExtractionHints;
use serde_json::Value;

use crate::context::metadata_keys;
use crate::context::PipelineContext;
use crate::stage::{Processor, StageKind, StageOutcome};

/// Extracts plain text from [`crate::context::IngestRequest::bytes`], using
/// the file name and content type as format hints.
pub struct ExtractProcessor {
    service: Arc<EnhancedExtractionService>,
}

impl ExtractProcessor {
    /// Build a processor over a shared extraction service.
    #[must_use]
    pub fn new(service: Arc<EnhancedExtractionService>) -> Self {
        Self { service }
    }

    fn record_metadata(ctx: &mut PipelineContext, extraction: &ExtractionResult) {
        ctx.metadata.insert(metadata_keys::EXTRACTED_TEXT.to_string(), Value::String(extraction.text.clone()));
        ctx.metadata.insert(metadata_keys::WORD_COUNT.to_string(), Value::from(extraction.word_count));
        ctx.metadata.insert(metadata_keys::PAGE_COUNT.to_string(), Value::from(extraction.page_count));
    }
}

#[async_trait]
impl Processor for ExtractProcessor {
    fn kind(&self) -> StageKind {
        StageKind::Extract
    }

    async fn process(&self, ctx: &mut PipelineContext) -> StageOutcome {
        let hints = ExtractionHints {
            filename: Some(ctx.request.original_file_name.clone()),
            mime_type: Some(ctx.request.content_type.clone()),
            extension_override: None,
        };

        match self.service.extract(&ctx.request.bytes, &hints).await {
            Ok(result) => {
                Self::record_metadata(ctx, &result);
                ctx.extraction = Some(result);
                StageOutcome::Success
            }
            Err(err) if ctx.request.options.skip_ai => {
                let placeholder = ExtractionResult::failure(err.to_string(), 0);
                Self::record_metadata(ctx, &placeholder);
                ctx.extraction = Some(placeholder);
                StageOutcome::Degraded { reason: format!("extraction failed, proceeding under skip_ai: {err}") }
            }
            Err(err) => {
                let stage_err = StageError::new(StageKind::Extract.as_str(), err.kind(), &err)
                    .with_document_id(ctx.document_id.clone().unwrap_or_default());
                StageOutcome::Fatal(stage_err)
            }
        }
    }
}
