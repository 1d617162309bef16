// SPDX-License-Identifier: MIT OR Apache-2.0
//! The canonical [`Document`] record and its nested metadata types (§3).

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Enumerated legal-document classification. Unknown values from a
/// classifier adapter are coerced to [`DocumentType::Other`] (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// A motion filed with a court.
    Motion,
    /// An initiating complaint or petition.
    Complaint,
    /// A court order or ruling.
    Order,
    /// A legal brief or memorandum.
    Brief,
    /// A contract or agreement.
    Contract,
    /// Correspondence (letters, emails) with legal relevance.
    Correspondence,
    /// A hearing or deposition transcript.
    Transcript,
    /// An exhibit attached to a filing.
    Exhibit,
    /// Anything that does not fit the above, or an unrecognised classifier value.
    Other,
}

impl DocumentType {
    /// Coerce an arbitrary classifier-provided string into a known variant,
    /// falling back to [`DocumentType::Other`] for anything unrecognised.
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "motion" => Self::Motion,
            "complaint" | "petition" => Self::Complaint,
            "order" | "ruling" => Self::Order,
            "brief" | "memorandum" | "memo" => Self::Brief,
            "contract" | "agreement" => Self::Contract,
            "correspondence" | "letter" | "email" => Self::Correspondence,
            "transcript" => Self::Transcript,
            "exhibit" => Self::Exhibit,
            _ => Self::Other,
        }
    }
}

/// Processing lifecycle of a document's metadata, independent of batch
/// [`JobStatus`](legaldex-batch) — this tracks the document itself, not the
/// job that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    /// Uploaded but not yet processed.
    Pending,
    /// Currently moving through the pipeline.
    Processing,
    /// Fully processed (classified, stored, indexed as requested).
    Processed,
    /// Processing failed; see the owning `ProcessResult` for detail.
    Failed,
}

/// Case number, name and type associated with a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CaseInfo {
    /// Docket/case number as filed with the court.
    pub case_number: Option<String>,
    /// Human-readable case name (e.g. "Doe v. Roe").
    pub case_name: Option<String>,
    /// Case type (e.g. "civil", "criminal", "family").
    pub case_type: Option<String>,
}

/// Level of the court a document originates from or is filed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum JurisdictionLevel {
    /// Federal court.
    Federal,
    /// State court.
    State,
    /// Local/municipal court.
    Local,
    /// Unknown or not classified.
    Other,
}

/// Court identification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CourtInfo {
    /// Name of the court.
    pub name: Option<String>,
    /// Jurisdiction level.
    pub jurisdiction_level: Option<JurisdictionLevel>,
    /// County, if applicable.
    pub county: Option<String>,
}

/// A named party to a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Party {
    /// Party's name.
    pub name: String,
    /// Role in the case (e.g. "plaintiff", "defendant").
    pub role: Option<String>,
    /// Party type (e.g. "individual", "organization").
    pub party_type: Option<String>,
}

/// An attorney of record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Attorney {
    /// Attorney's name.
    pub name: String,
    /// Role (e.g. "counsel for plaintiff").
    pub role: Option<String>,
    /// Firm or organisation.
    pub organization: Option<String>,
}

/// A cited legal authority (case law, statute, regulation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Authority {
    /// Citation string as it appears in the source text.
    pub citation: String,
    /// Human-readable title, if resolved.
    pub title: Option<String>,
    /// Link to the authority, if resolved.
    pub url: Option<String>,
}

/// Nested metadata attached to every [`Document`] (§3).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DocumentMetadata {
    /// Short subject line.
    pub subject: Option<String>,
    /// Longer free-text summary.
    pub summary: Option<String>,
    /// Classified document type, mirrored from [`Document::document_type`]
    /// so that metadata is self-describing when extracted independently.
    pub document_type: Option<DocumentType>,
    /// Processing status of this document.
    pub status: Option<ProcessingStatus>,
    /// Detected language (ISO 639-1 code), if known.
    pub language: Option<String>,
    /// When classification/processing completed.
    pub processed_at: Option<DateTime<Utc>>,
    /// Classifier confidence in `[0, 1]`.
    pub confidence: f64,
    /// Whether metadata was produced by an AI classifier (vs. defaulted).
    pub ai_classified: bool,
    /// Free-form legal tags drawn from a deployment-configured vocabulary.
    pub legal_tags: BTreeSet<String>,
    /// Date the document was filed with the court.
    pub filing_date: Option<NaiveDate>,
    /// Date of the underlying event the document concerns.
    pub event_date: Option<NaiveDate>,
    /// Date of a scheduled or held hearing.
    pub hearing_date: Option<NaiveDate>,
    /// Date a decision was rendered.
    pub decision_date: Option<NaiveDate>,
    /// Date the document was served on a party.
    pub served_date: Option<NaiveDate>,
    /// Case identification.
    pub case_info: Option<CaseInfo>,
    /// Court identification.
    pub court_info: Option<CourtInfo>,
    /// Parties to the case.
    pub parties: Vec<Party>,
    /// Attorneys of record.
    pub attorneys: Vec<Attorney>,
    /// Cited legal authorities.
    pub authorities: Vec<Authority>,
}

/// The canonical ingested document record (§3).
///
/// `id` is immutable after first persist. `updated_at` is always `>=`
/// `created_at`. `size` matches the stored blob length at PUT time — the
/// caller (the `Store` pipeline stage) is responsible for keeping this
/// invariant true; this type does not enforce it itself since it has no
/// access to the object store.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Document {
    /// Stable identifier, globally unique within the installation.
    pub id: String,
    /// Original uploaded file name.
    pub original_file_name: String,
    /// Storage path within the object store.
    pub storage_path: String,
    /// Public or signed URL to the stored bytes, if known.
    pub url: Option<String>,
    /// Extracted plain text.
    pub text: String,
    /// MIME content type of the original upload.
    pub content_type: String,
    /// Byte size of the stored blob.
    pub size: u64,
    /// Stable content hash of the extracted text (§9 — see DESIGN.md for why
    /// this departs from the reference implementation's id-prefix
    /// placeholder).
    pub hash: String,
    /// When the document was first persisted.
    pub created_at: DateTime<Utc>,
    /// When the document was last updated.
    pub updated_at: DateTime<Utc>,
    /// Classified document type.
    pub document_type: DocumentType,
    /// Legal category, drawn from a deployment-configured closed vocabulary.
    pub legal_category: String,
    /// Nested metadata.
    pub metadata: DocumentMetadata,
}

/// Compute the stable content hash used for [`Document::hash`].
///
/// The spec requires only that the same text produce the same hash across
/// runs and hosts (§8 "Hash stability"); it does not mandate an algorithm.
/// We use SHA-256 over the UTF-8 bytes of the extracted text, hex-encoded.
#[must_use]
pub fn compute_text_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// Characters that must be replaced with `_` when building a storage path
/// from an original file name (§4.4).
const SANITISE_CHARS: [char; 2] = [' ', '/'];

/// Sanitise a file name for embedding in a storage path: replaces spaces and
/// path separators with `_`.
#[must_use]
pub fn sanitise_filename(name: &str) -> String {
    name.chars()
        .map(|c| if SANITISE_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Build the canonical storage path `documents/{YYYY}/{MM}/{id}/{sanitised-filename}`
/// (§4.4). `at` is the timestamp used for the year/month components — callers
/// pass the document's `created_at`.
#[must_use]
pub fn build_storage_path(at: DateTime<Utc>, id: &str, original_file_name: &str) -> String {
    format!(
        "documents/{:04}/{:02}/{id}/{}",
        at.format("%Y").to_string().parse::<u32>().unwrap_or(0),
        at.format("%m").to_string().parse::<u32>().unwrap_or(0),
        sanitise_filename(original_file_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn hash_is_stable_for_same_text() {
        let a = compute_text_hash("hello world");
        let b = compute_text_hash("hello world");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn hash_differs_for_different_text() {
        assert_ne!(compute_text_hash("a"), compute_text_hash("b"));
    }

    #[test]
    fn sanitise_filename_replaces_spaces_and_slashes() {
        assert_eq!(sanitise_filename("my file/name.pdf"), "my_file_name.pdf");
    }

    #[test]
    fn storage_path_matches_spec_shape() {
        let at = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        let path = build_storage_path(at, "doc-123", "My Filing.pdf");
        assert_eq!(path, "documents/2024/03/doc-123/My_Filing.pdf");
    }

    #[test]
    fn document_type_coerces_unknown_to_other() {
        assert_eq!(DocumentType::coerce("motion"), DocumentType::Motion);
        assert_eq!(DocumentType::coerce("MOTION"), DocumentType::Motion);
        assert_eq!(DocumentType::coerce("subpoena"), DocumentType::Other);
    }
}
