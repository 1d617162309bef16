// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`ExtractionHints`] — caller-supplied context used to resolve a format
//! and steer extraction (§4.2).

/// Caller-supplied metadata accompanying a byte stream to be extracted.
#[derive(Debug, Clone, Default)]
pub struct ExtractionHints {
    /// Original file name, if known; used to derive an extension.
    pub filename: Option<String>,
    /// MIME content type, if known.
    pub mime_type: Option<String>,
    /// Caller-forced extension, bypassing filename/MIME resolution.
    pub extension_override: Option<String>,
}

impl ExtractionHints {
    /// Build hints from just a filename.
    #[must_use]
    pub fn from_filename(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            mime_type: None,
            extension_override: None,
        }
    }
}

/// Known MIME type -> extension mappings consulted by the registry when no
/// extension can be derived from the filename.
pub(crate) const MIME_EXTENSIONS: &[(&str, &str)] = &[
    ("text/plain", "txt"),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "docx",
    ),
    ("application/pdf", "pdf"),
];

/// Resolve the extractor-registry format key from `hints`: extension →
/// MIME → `"txt"` default, per §4.2.
#[must_use]
pub fn resolve_format(hints: &ExtractionHints) -> String {
    if let Some(ext) = &hints.extension_override {
        return ext.to_ascii_lowercase();
    }
    if let Some(name) = &hints.filename {
        if let Some(ext) = name.rsplit('.').next() {
            if ext != name {
                return ext.to_ascii_lowercase();
            }
        }
    }
    if let Some(mime) = &hints.mime_type {
        for (candidate_mime, ext) in MIME_EXTENSIONS {
            if candidate_mime.eq_ignore_ascii_case(mime) {
                return (*ext).to_string();
            }
        }
    }
    "txt".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_from_filename_extension() {
        let hints = ExtractionHints::from_filename("exhibit.PDF");
        assert_eq!(resolve_format(&hints), "pdf");
    }

    #[test]
    fn resolves_from_mime_when_no_extension() {
        let hints = ExtractionHints {
            filename: None,
            mime_type: Some("application/pdf".to_string()),
            extension_override: None,
        };
        assert_eq!(resolve_format(&hints), "pdf");
    }

    #[test]
    fn defaults_to_txt() {
        let hints = ExtractionHints::default();
        assert_eq!(resolve_format(&hints), "txt");
    }

    #[test]
    fn extension_override_wins() {
        let hints = ExtractionHints {
            filename: Some("doc.pdf".to_string()),
            mime_type: None,
            extension_override: Some("docx".to_string()),
        };
        assert_eq!(resolve_format(&hints), "docx");
    }
}
