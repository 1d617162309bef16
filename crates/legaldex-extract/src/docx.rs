// SPDX-License-Identifier: MIT OR Apache-2.0
//! DOCX extractor (§4.2 "DOCX"): reads the zip-packaged `word/document.xml`
//! and `docProps/core.xml` parts.

use std::io::{Cursor, Read};

use async_trait::async_trait;
use legaldex_core::ExtractionResult;
use legaldex_textclean::{clean, CleanerConfig};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use zip::ZipArchive;

use crate::error::ExtractError;
use crate::hints::ExtractionHints;
use crate::registry::Extractor;

/// Core-properties fields lifted from `docProps/core.xml`, keyed by their
/// local (namespace-stripped) element name.
const CORE_PROPERTY_FIELDS: &[&str] = &["title", "creator", "subject", "description", "created", "modified"];

/// Extracts plain text from a `.docx` package.
pub struct DocxExtractor {
    cleaner_config: CleanerConfig,
}

impl DocxExtractor {
    /// Build an extractor using `cleaner_config` for the post-extraction
    /// cleaning pass.
    #[must_use]
    pub fn new(cleaner_config: CleanerConfig) -> Self {
        Self { cleaner_config }
    }
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new(CleanerConfig::default())
    }
}

fn local_name(qualified: &str) -> &str {
    qualified.split(':').next_back().unwrap_or(qualified)
}

/// Read `word/document.xml` out of `archive`, joining `w:t` text runs and
/// inserting `\n` at each `w:p` paragraph boundary.
fn extract_document_text(archive: &mut ZipArchive<Cursor<&[u8]>>) -> Result<String, ExtractError> {
    let mut entry = archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::InvalidFormat {
            format: "docx".to_string(),
            reason: format!("missing word/document.xml: {e}"),
        })?;
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::ExtractionFailed {
            cause: e.to_string(),
            format: "docx".to_string(),
            partial_text: None,
        })?;
    drop(entry);

    let mut reader = Reader::from_str(&xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut out = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if local_name(&name) == "t" {
                    in_text_run = true;
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match local_name(&name) {
                    "t" => in_text_run = false,
                    "p" => out.push('\n'),
                    _ => {}
                }
            }
            Ok(Event::Text(e)) if in_text_run => {
                out.push_str(&e.unescape().unwrap_or_default());
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::ExtractionFailed {
                    cause: e.to_string(),
                    format: "docx".to_string(),
                    partial_text: if out.is_empty() { None } else { Some(out) },
                })
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}

/// Read `docProps/core.xml` out of `archive` into a flat name → value map.
/// Absent or malformed core properties are not an error: the part is
/// optional metadata, not load-bearing text.
fn extract_core_properties(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
) -> std::collections::BTreeMap<String, serde_json::Value> {
    let mut map = std::collections::BTreeMap::new();
    let Ok(mut entry) = archive.by_name("docProps/core.xml") else {
        return map;
    };
    let mut xml = String::new();
    if entry.read_to_string(&mut xml).is_err() {
        return map;
    }
    drop(entry);

    let mut reader = Reader::from_str(&xml);
    let mut buf = Vec::new();
    let mut current_field: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let local = local_name(&name).to_string();
                if CORE_PROPERTY_FIELDS.contains(&local.as_str()) {
                    current_field = Some(local);
                }
            }
            Ok(Event::End(_)) => current_field = None,
            Ok(Event::Text(e)) => {
                if let Some(field) = &current_field {
                    let value = e.unescape().unwrap_or_default().to_string();
                    map.insert(field.clone(), serde_json::Value::String(value));
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    map
}

#[async_trait]
impl Extractor for DocxExtractor {
    fn supported_formats(&self) -> &'static [&'static str] {
        &["docx"]
    }

    async fn extract(
        &self,
        bytes: &[u8],
        _hints: &ExtractionHints,
    ) -> Result<ExtractionResult, ExtractError> {
        let start = std::time::Instant::now();
        let mut archive =
            ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractError::InvalidFormat {
                format: "docx".to_string(),
                reason: format!("not a valid zip archive: {e}"),
            })?;

        let raw_text = extract_document_text(&mut archive)?;
        let metadata = extract_core_properties(&mut archive);
        let cleaned = clean(&raw_text, &self.cleaner_config);
        let duration_ms = start.elapsed().as_millis() as u64;

        let mut result = ExtractionResult::from_text(cleaned, 1, duration_ms).with_method("docx");
        result.metadata.extend(metadata);
        Ok(result)
    }
}
