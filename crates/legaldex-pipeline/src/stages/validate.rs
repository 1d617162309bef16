// SPDX-License-Identifier: MIT OR Apache-2.0
//! The `Validate` stage (§4.5): input-shape checks that, on failure, abort
//! the pipeline outright.

use async_trait::async_trait;
use legaldex_core::{ErrorKind, StageError};
use uuid::Uuid;

use crate::context::PipelineContext;
use crate::stage::{Processor, StageKind, StageOutcome};

/// Confirms the request carries a usable file name and non-empty bytes, and
/// assigns [`PipelineContext::document_id`] when the caller did not supply
/// one (§4.4 "a caller-provided stable key OR a newly minted unique
/// identifier").
#[derive(Debug, Default)]
pub struct ValidateProcessor;

impl ValidateProcessor {
    /// Build a new stateless validator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Processor for ValidateProcessor {
    fn kind(&self) -> StageKind {
        StageKind::Validate
    }

    async fn process(&self, ctx: &mut PipelineContext) -> StageOutcome {
        if ctx.request.original_file_name.trim().is_empty() {
            return StageOutcome::Fatal(StageError::new(
                StageKind::Validate.as_str(),
                ErrorKind::Validation,
                "original file name is required",
            ));
        }
        if ctx.request.bytes.is_empty() {
            let err = StageError::new(StageKind::Validate.as_str(), ErrorKind::Validation, "upload is empty")
                .with_document_id(ctx.document_id.clone().unwrap_or_default());
            return StageOutcome::Fatal(err);
        }

        let id = ctx
            .request
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        ctx.document_id = Some(id);

        StageOutcome::Success
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::context::{IngestOptions, IngestRequest};

    use super::*;

    fn request(name: &str, bytes: &[u8]) -> IngestRequest {
        IngestRequest {
            id: None,
            original_file_name: name.to_string(),
            content_type: "text/plain".to_string(),
            bytes: bytes.to_vec(),
            options: IngestOptions::default(),
        }
    }

    #[tokio::test]
    async fn mints_an_id_when_caller_supplied_none() {
        let mut ctx = PipelineContext::new(request("notice.txt", b"hello"), Duration::from_secs(30));
        let outcome = ValidateProcessor::new().process(&mut ctx).await;
        assert!(matches!(outcome, StageOutcome::Success));
        assert!(ctx.document_id.is_some());
    }

    #[tokio::test]
    async fn keeps_caller_supplied_id() {
        let mut req = request("notice.txt", b"hello");
        req.id = Some("doc-42".to_string());
        let mut ctx = PipelineContext::new(req, Duration::from_secs(30));
        ValidateProcessor::new().process(&mut ctx).await;
        assert_eq!(ctx.document_id.as_deref(), Some("doc-42"));
    }

    #[tokio::test]
    async fn empty_file_name_is_fatal() {
        let mut ctx = PipelineContext::new(request("", b"hello"), Duration::from_secs(30));
        let outcome = ValidateProcessor::new().process(&mut ctx).await;
        assert!(matches!(outcome, StageOutcome::Fatal(_)));
    }

    #[tokio::test]
    async fn empty_bytes_are_fatal() {
        let mut ctx = PipelineContext::new(request("notice.txt", b""), Duration::from_secs(30));
        let outcome = ValidateProcessor::new().process(&mut ctx).await;
        assert!(matches!(outcome, StageOutcome::Fatal(_)));
    }
}
