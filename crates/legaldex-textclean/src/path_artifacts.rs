// SPDX-License-Identifier: MIT OR Apache-2.0
//! Strips nested path prefixes and fused filename timestamps (§4.1
//! `remove_file_path_artifacts`).

use std::sync::OnceLock;

use regex::Regex;

static FUSED_TIMESTAMP_RE: OnceLock<Regex> = OnceLock::new();
static FULL_ARTIFACT_RE: OnceLock<Regex> = OnceLock::new();

/// Matches a day-of-week + month + day + time + year sequence fused
/// directly onto a filename stem with no separating whitespace, e.g.
/// `reportMonJan0512:00:002024.pdf`.
fn fused_timestamp_re() -> &'static Regex {
    FUSED_TIMESTAMP_RE.get_or_init(|| {
        Regex::new(
            r"(?:Mon|Tue|Wed|Thu|Fri|Sat|Sun)(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\d{2}\d{2}:\d{2}:\d{2}\d{4}",
        )
        .expect("valid fused-timestamp regex")
    })
}

/// Matches a whole `path/segments/filename.ext` + fused, space-separated
/// timestamp artifact (e.g. `data/data/data/!KOTRLAF.txtWed Apr 30
/// 18:55:26 2025`), as produced when a file-system walker's path and a
/// `time.Time` string get concatenated into the same field with no
/// separator. The entire match — path, filename and timestamp — is noise
/// and is dropped outright rather than deduplicated.
fn full_artifact_re() -> &'static Regex {
    FULL_ARTIFACT_RE.get_or_init(|| {
        Regex::new(
            r"(?:[A-Za-z0-9_]+/)+[!A-Za-z0-9_]+\.(?:txt|pdf|docx|doc|rtf)(?:Mon|Tue|Wed|Thu|Fri|Sat|Sun) (?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec) \d{1,2} \d{2}:\d{2}:\d{2} \d{4}",
        )
        .expect("valid full-artifact regex")
    })
}

/// Strip nested directory-prefix duplication and fused filename timestamps
/// from `text`.
///
/// `regex` does not support backreferences, so the repeated-segment check is
/// done manually by scanning path-like tokens rather than via a regex.
#[must_use]
pub fn strip_path_artifacts(text: &str) -> String {
    let stripped = full_artifact_re().replace_all(text, "").into_owned();
    let deduped = strip_duplicated_path_segments(&stripped);
    fused_timestamp_re().replace_all(&deduped, "").into_owned()
}

/// For each whitespace-delimited token that looks like a path
/// (`segment/segment/.../file.ext`), collapse any immediately-repeated
/// directory segment (`data/data/x` -> `data/x`).
fn strip_duplicated_path_segments(text: &str) -> String {
    text.split_inclusive(char::is_whitespace)
        .map(dedupe_token)
        .collect()
}

fn dedupe_token(token: &str) -> String {
    let trimmed_end: String = token
        .chars()
        .rev()
        .take_while(|c| c.is_whitespace())
        .collect();
    let core = &token[..token.len() - trimmed_end.len()];

    if !core.contains('/') && !core.contains('\\') {
        return token.to_string();
    }

    let sep = if core.contains('/') { '/' } else { '\\' };
    let parts: Vec<&str> = core.split(sep).collect();
    let mut out: Vec<&str> = Vec::with_capacity(parts.len());
    for part in parts {
        if out.last() == Some(&part) && !part.is_empty() {
            continue;
        }
        out.push(part);
    }
    let mut rebuilt = out.join(&sep.to_string());
    rebuilt.push_str(&trimmed_end.chars().rev().collect::<String>());
    rebuilt
}
