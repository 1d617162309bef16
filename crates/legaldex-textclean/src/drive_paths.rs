// SPDX-License-Identifier: MIT OR Apache-2.0
//! Strips Windows drive-letter paths and UNC paths (§4.1
//! `remove_drive_path_references`).

use std::sync::OnceLock;

use regex::Regex;

static DRIVE_PATH_RE: OnceLock<Regex> = OnceLock::new();
static UNC_PATH_RE: OnceLock<Regex> = OnceLock::new();

fn drive_path_re() -> &'static Regex {
    DRIVE_PATH_RE.get_or_init(|| {
        Regex::new(r"[A-Za-z]:\\(?:[^\s\\]+\\)*[^\s\\]+").expect("valid drive-path regex")
    })
}

fn unc_path_re() -> &'static Regex {
    UNC_PATH_RE.get_or_init(|| {
        Regex::new(r"\\\\[^\s\\]+(?:\\[^\s\\]+)+").expect("valid UNC-path regex")
    })
}

/// Strip Windows drive paths (`C:\Users\...`) and UNC paths
/// (`\\server\share\...`) from `text`.
#[must_use]
pub fn strip_drive_paths(text: &str) -> String {
    let stripped = drive_path_re().replace_all(text, "");
    unc_path_re().replace_all(&stripped, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_windows_drive_path() {
        let input = "See exhibit at C:\\Users\\Alice\\Documents\\exhibit.pdf for detail";
        let out = strip_drive_paths(input);
        assert!(!out.contains("C:\\"));
        assert!(out.contains("for detail"));
    }

    #[test]
    fn strips_unc_path() {
        let input = r"Filed from \\fileserver\legal\cases\2024\doc.pdf today";
        let out = strip_drive_paths(input);
        assert!(!out.contains(r"\\fileserver"));
        assert!(out.contains("today"));
    }

    #[test]
    fn leaves_unrelated_text_untouched() {
        let input = "The plaintiff filed a motion on March 3rd.";
        assert_eq!(strip_drive_paths(input), input);
    }
}
