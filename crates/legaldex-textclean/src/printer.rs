// SPDX-License-Identifier: MIT OR Apache-2.0
//! Strips printer/PCL font-descriptor tokens and control-character runs
//! (§4.1 `remove_printer_artifacts`).

use std::sync::OnceLock;

use regex::Regex;

static FONT_TOKEN_RE: OnceLock<Regex> = OnceLock::new();
static CONTROL_RUN_RE: OnceLock<Regex> = OnceLock::new();

/// HP LaserJet/PRS font-descriptor escape tokens, e.g. `(8U`, `(0N`,
/// `(s0p12h10v0s0b4099T`.
fn font_token_re() -> &'static Regex {
    FONT_TOKEN_RE.get_or_init(|| {
        Regex::new(r"\x1B?\([0-9]*[A-Za-z]|\x1B\(s[0-9]+[a-z][0-9]*[a-z](?:[0-9]+[a-z])*[A-Za-z]?")
            .expect("valid font token regex")
    })
}

/// Runs of three or more non-printable control characters (excluding the
/// whitespace control characters tab/newline/carriage-return).
fn control_run_re() -> &'static Regex {
    CONTROL_RUN_RE.get_or_init(|| {
        Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]{3,}").expect("valid control run regex")
    })
}

/// Strip printer control-stream artifacts from `text`.
#[must_use]
pub fn strip_printer_artifacts(text: &str) -> String {
    let stripped = control_run_re().replace_all(text, "");
    font_token_re().replace_all(&stripped, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_font_descriptor_tokens() {
        let input = "Notice\u{1B}(8UTo all parties";
        let out = strip_printer_artifacts(input);
        assert!(!out.contains("(8U"));
        assert!(out.contains("Notice"));
        assert!(out.contains("To all parties"));
    }

    #[test]
    fn strips_control_character_runs() {
        let input = format!("before{}{}{}{}after", '\u{01}', '\u{02}', '\u{03}', '\u{04}');
        let out = strip_printer_artifacts(&input);
        assert_eq!(out, "beforeafter");
    }

    #[test]
    fn leaves_ordinary_whitespace_alone() {
        let input = "line one\nline two\tindented";
        assert_eq!(strip_printer_artifacts(input), input);
    }
}
