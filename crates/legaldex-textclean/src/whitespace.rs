// SPDX-License-Identifier: MIT OR Apache-2.0
//! Final whitespace-normalisation pass, applied unconditionally regardless
//! of which other passes ran (§4.1 "final pass").

/// Normalise line endings to `\n`, collapse runs of 3+ newlines to exactly
/// two, and strip leading/trailing whitespace.
///
/// When `preserve_legal_structure` is `false`, blank lines are dropped
/// entirely (collapsing every paragraph break) rather than merely bounded
/// to two consecutive newlines.
#[must_use]
pub fn normalize_whitespace(text: &str, preserve_legal_structure: bool) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let trimmed_lines: Vec<&str> = unified.lines().map(str::trim_end).collect();

    let collapsed = if preserve_legal_structure {
        trimmed_lines.join("\n")
    } else {
        trimmed_lines
            .into_iter()
            .filter(|l| !l.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut result = String::with_capacity(collapsed.len());
    let mut newline_run = 0usize;
    for ch in collapsed.chars() {
        if ch == '\n' {
            newline_run += 1;
            if newline_run <= 2 {
                result.push(ch);
            }
        } else {
            newline_run = 0;
            result.push(ch);
        }
    }

    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unifies_line_endings() {
        let input = "line one\r\nline two\rline three";
        let out = normalize_whitespace(input, true);
        assert_eq!(out, "line one\nline two\nline three");
    }

    #[test]
    fn collapses_triple_newlines_to_two_when_preserving_structure() {
        let input = "para one\n\n\n\npara two";
        let out = normalize_whitespace(input, true);
        assert_eq!(out, "para one\n\npara two");
    }

    #[test]
    fn drops_blank_lines_when_not_preserving_structure() {
        let input = "para one\n\n\n\npara two";
        let out = normalize_whitespace(input, false);
        assert_eq!(out, "para one\npara two");
    }

    #[test]
    fn strips_leading_and_trailing_whitespace() {
        let input = "  \n\n  content here  \n\n  ";
        let out = normalize_whitespace(input, false);
        assert_eq!(out, "content here");
    }

    #[test]
    fn strips_trailing_whitespace_per_line() {
        let input = "line one   \nline two\t\t";
        let out = normalize_whitespace(input, true);
        assert_eq!(out, "line one\nline two");
    }
}
