// SPDX-License-Identifier: MIT OR Apache-2.0
//! Document assembly (§4.4): builds the canonical [`Document`] from a
//! [`PipelineContext`]'s accumulated extraction/classification state.

use chrono::{DateTime, NaiveDate, Utc};
use legaldex_core::{
    compute_text_hash, CaseInfo, CourtInfo, Document, DocumentMetadata, DocumentType, ProcessingStatus,
};

use crate::context::PipelineContext;

fn parse_iso_date(raw: &Option<String>) -> Option<NaiveDate> {
    raw.as_deref().and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

fn metadata_from_classification(ctx: &PipelineContext, document_type: DocumentType, now: DateTime<Utc>) -> DocumentMetadata {
    let Some(classification) = ctx.classification.as_ref() else {
        return DocumentMetadata {
            document_type: Some(document_type),
            status: Some(ProcessingStatus::Processed),
            confidence: 0.0,
            ai_classified: false,
            ..DocumentMetadata::default()
        };
    };

    DocumentMetadata {
        subject: classification.subject.clone(),
        summary: classification.summary.clone(),
        document_type: Some(document_type),
        status: Some(ProcessingStatus::Processed),
        language: ctx.extraction.as_ref().and_then(|e| e.language.clone()),
        processed_at: Some(now),
        confidence: classification.confidence,
        ai_classified: true,
        legal_tags: classification.legal_tags.clone(),
        filing_date: parse_iso_date(&classification.dates.filing_date),
        event_date: parse_iso_date(&classification.dates.event_date),
        hearing_date: parse_iso_date(&classification.dates.hearing_date),
        decision_date: parse_iso_date(&classification.dates.decision_date),
        served_date: parse_iso_date(&classification.dates.served_date),
        case_info: classification.case_info.clone().or_else(|| Some(CaseInfo::default())).filter(is_case_info_populated),
        court_info: classification.court_info.clone().or_else(|| Some(CourtInfo::default())).filter(is_court_info_populated),
        parties: classification.parties.clone(),
        attorneys: classification.attorneys.clone(),
        authorities: classification.authorities.clone(),
    }
}

fn is_case_info_populated(info: &CaseInfo) -> bool {
    info.case_number.is_some() || info.case_name.is_some() || info.case_type.is_some()
}

fn is_court_info_populated(info: &CourtInfo) -> bool {
    info.name.is_some() || info.jurisdiction_level.is_some() || info.county.is_some()
}

/// Build a [`Document`] from `ctx`'s current state.
///
/// `storage_path`/`url` are supplied by the calling stage (the Store stage
/// passes the path it actually wrote to; the Index stage passes an empty
/// synthetic path when Store never ran or failed, per §4.5's "document
/// considered indexed-only"). `created_at` is carried forward from
/// [`PipelineContext::document`] when one was already assembled earlier in
/// this run (e.g. by Store, before Index re-assembles), so re-assembly
/// never moves a document's creation time.
#[must_use]
pub fn assemble_document(
    ctx: &PipelineContext,
    default_legal_category: &str,
    storage_path: String,
    url: Option<String>,
    now: DateTime<Utc>,
) -> Document {
    let id = ctx
        .document_id
        .clone()
        .or_else(|| ctx.request.id.clone())
        .expect("Validate assigns document_id before any later stage runs");
    let text = ctx.extraction.as_ref().map(|e| e.text.clone()).unwrap_or_default();
    let document_type = ctx
        .classification
        .as_ref()
        .and_then(|c| c.document_type)
        .unwrap_or(DocumentType::Other);
    let legal_category = ctx
        .classification
        .as_ref()
        .and_then(|c| c.legal_category.clone())
        .unwrap_or_else(|| default_legal_category.to_string());
    let created_at = ctx.document.as_ref().map_or(now, |d| d.created_at);

    Document {
        id,
        original_file_name: ctx.request.original_file_name.clone(),
        storage_path,
        url,
        hash: compute_text_hash(&text),
        text,
        content_type: ctx.request.content_type.clone(),
        size: ctx.request.bytes.len() as u64,
        created_at,
        updated_at: now,
        document_type,
        legal_category,
        metadata: metadata_from_classification(ctx, document_type, now),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use legaldex_core::{ClassificationResult, RawDates};

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

    #[test]
    fn defaults_document_type_and_legal_category_without_classification() {
        let context = ctx();
        let doc = assemble_document(&context, "Civil", "documents/2026/01/doc-1/Motion.pdf".to_string(), None, Utc::now());
        assert_eq!(doc.document_type, DocumentType::Other);
        assert_eq!(doc.legal_category, "Civil");
        assert!(!doc.metadata.ai_classified);
    }

    #[test]
    fn uses_classification_when_present() {
        let mut context = ctx();
        context.classification = Some(ClassificationResult {
            document_type: Some(DocumentType::Motion),
            legal_category: Some("Criminal".to_string()),
            confidence: 0.8,
            dates: RawDates { filing_date: Some("2024-03-14".to_string()), ..Default::default() },
            ..Default::default()
        });
        let doc = assemble_document(&context, "Civil", "documents/2026/01/doc-1/Motion.pdf".to_string(), None, Utc::now());
        assert_eq!(doc.document_type, DocumentType::Motion);
        assert_eq!(doc.legal_category, "Criminal");
        assert!(doc.metadata.ai_classified);
        assert_eq!(doc.metadata.filing_date, NaiveDate::from_ymd_opt(2024, 3, 14));
    }

    #[test]
    fn reassembly_preserves_original_created_at() {
        let mut context = ctx();
        let first = assemble_document(&context, "Civil", "path".to_string(), None, Utc::now());
        context.document = Some(first.clone());
        std::thread::sleep(Duration::from_millis(5));
        let second = assemble_document(&context, "Civil", "path".to_string(), None, Utc::now());
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
    }
}
