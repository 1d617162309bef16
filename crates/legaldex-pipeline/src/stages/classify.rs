// SPDX-License-Identifier: MIT OR Apache-2.0
//! The `Classify` stage (§4.5): dispatches extracted text to the
//! [`ClassifierRouter`], or short-circuits to a defaulted classification
//! under `skip_ai`. Always recoverable — failure never aborts the pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use legaldex_classify::{ClassifierRouter, ClassifyHints};
use legaldex_ratelimit::RateLimiter;
use serde_json::Value;

use crate::context::metadata_keys;
use crate::context::PipelineContext;
use crate::stage::{Processor, StageKind, StageOutcome};

/// Routes extracted text to a configured classifier provider and records
/// the result's headline fields into the cross-stage metadata map.
pub struct ClassifyProcessor {
    router: Arc<ClassifierRouter>,
    rate_limiter: Option<Arc<RateLimiter>>,
    default_legal_category: String,
}

impl ClassifyProcessor {
    /// Build a processor over a shared router, optionally gated behind a
    /// rate limiter keyed on [`crate::context::IngestOptions::rate_limit_key`].
    #[must_use]
    pub fn new(router: Arc<ClassifierRouter>, rate_limiter: Option<Arc<RateLimiter>>, default_legal_category: impl Into<String>) -> Self {
        Self { router, rate_limiter, default_legal_category: default_legal_category.into() }
    }

    fn apply_defaults(&self, ctx: &mut PipelineContext) {
        ctx.metadata.insert(metadata_keys::DOCUMENT_TYPE.to_string(), Value::String("other".to_string()));
        ctx.metadata.insert(
            metadata_keys::LEGAL_CATEGORY.to_string(),
            Value::String(self.default_legal_category.clone()),
        );
        ctx.metadata.insert(metadata_keys::CONFIDENCE.to_string(), Value::from(0.0));
    }

    fn record_metadata(ctx: &mut PipelineContext) {
        let Some(result) = ctx.classification.as_ref() else { return };
        if let Some(document_type) = result.document_type {
            if let Ok(value) = serde_json::to_value(document_type) {
                ctx.metadata.insert(metadata_keys::DOCUMENT_TYPE.to_string(), value);
            }
        }
        if let Some(legal_category) = &result.legal_category {
            ctx.metadata
                .insert(metadata_keys::LEGAL_CATEGORY.to_string(), Value::String(legal_category.clone()));
        }
        ctx.metadata.insert(metadata_keys::CONFIDENCE.to_string(), Value::from(result.confidence));
        for (key, value) in [
            (metadata_keys::FILING_DATE, &result.dates.filing_date),
            (metadata_keys::EVENT_DATE, &result.dates.event_date),
            (metadata_keys::HEARING_DATE, &result.dates.hearing_date),
            (metadata_keys::DECISION_DATE, &result.dates.decision_date),
            (metadata_keys::SERVED_DATE, &result.dates.served_date),
        ] {
            if let Some(value) = value {
                ctx.metadata.insert(key.to_string(), Value::String(value.clone()));
            }
        }
    }
}

#[async_trait]
impl Processor for ClassifyProcessor {
    fn kind(&self) -> StageKind {
        StageKind::Classify
    }

    async fn process(&self, ctx: &mut PipelineContext) -> StageOutcome {
        if ctx.request.options.skip_ai {
            ctx.classification = None;
            ctx.classification_applied = false;
            self.apply_defaults(ctx);
            return StageOutcome::Success;
        }

        if let Some(limiter) = &self.rate_limiter {
            let key = ctx.request.options.rate_limit_key.as_deref().unwrap_or("classify");
            if let Err(err) = limiter.acquire(key, 1.0, ctx.deadline.into_std()).await {
                ctx.classification = None;
                ctx.classification_applied = false;
                self.apply_defaults(ctx);
                return StageOutcome::Degraded { reason: err.to_string() };
            }
        }

        let text = ctx.extraction.as_ref().map(|e| e.text.clone()).unwrap_or_default();
        let hints = ClassifyHints {
            filename: Some(ctx.request.original_file_name.clone()),
            content_type: Some(ctx.request.content_type.clone()),
        };
        let requested = ctx.request.options.classifier_provider.as_deref();
        let now = Utc::now().date_naive();

        match self.router.classify(&text, &hints, requested, now).await {
            Ok(result) => {
                ctx.classification = Some(result);
                ctx.classification_applied = true;
                Self::record_metadata(ctx);
                StageOutcome::Success
            }
            Err(err) => {
                ctx.classification = None;
                ctx.classification_applied = false;
                self.apply_defaults(ctx);
                StageOutcome::Degraded { reason: err.to_string() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait as at;
    use legaldex_classify::ClassifierProvider;
    use legaldex_classify::ClassifyError;
    use legaldex_config::PlausibilityWindow;
    use legaldex_core::{ClassificationResult, DocumentType};

    use crate::context::{IngestOptions, IngestRequest};

    use super::*;

    struct FakeProvider {
        result: ClassificationResult,
    }

    #[at]
    impl ClassifierProvider for FakeProvider {
        fn name(&self) -> &'static str {
            "cloud-large"
        }
        fn is_configured(&self) -> bool {
            true
        }
        fn supported_categories(&self) -> &'static [&'static str] {
            &["Civil"]
        }
        async fn classify(&self, _prompt: &str, _hints: &ClassifyHints) -> Result<ClassificationResult, ClassifyError> {
            Ok(self.result.clone())
        }
    }

    fn request() -> IngestRequest {
        IngestRequest {
            id: Some("doc-1".to_string()),
            original_file_name: "motion.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: b"bytes".to_vec(),
            options: IngestOptions::default(),
        }
    }

    fn router() -> Arc<ClassifierRouter> {
        let now = chrono::Utc::now().date_naive();
        Arc::new(ClassifierRouter::new(
            vec![Arc::new(FakeProvider {
                result: ClassificationResult { document_type: Some(DocumentType::Motion), ..Default::default() },
            })],
            legaldex_classify::prompt::PromptCatalog::with_defaults(),
            PlausibilityWindow::default_at(now),
            "Civil",
        ))
    }

    #[tokio::test]
    async fn skip_ai_short_circuits_to_defaults() {
        let processor = ClassifyProcessor::new(router(), None, "Civil");
        let mut req = request();
        req.options.skip_ai = true;
        let mut ctx = PipelineContext::new(req, Duration::from_secs(30));
        let outcome = processor.process(&mut ctx).await;
        assert!(matches!(outcome, StageOutcome::Success));
        assert!(ctx.classification.is_none());
        assert!(!ctx.classification_applied);
    }

    #[tokio::test]
    async fn successful_classification_is_recorded() {
        let processor = ClassifyProcessor::new(router(), None, "Civil");
        let mut ctx = PipelineContext::new(request(), Duration::from_secs(30));
        let outcome = processor.process(&mut ctx).await;
        assert!(matches!(outcome, StageOutcome::Success));
        assert!(ctx.classification_applied);
        assert_eq!(ctx.classification.unwrap().document_type, Some(DocumentType::Motion));
    }
}
