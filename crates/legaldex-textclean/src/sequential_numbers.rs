// SPDX-License-Identifier: MIT OR Apache-2.0
//! Strips lines dominated by a monotonically-increasing digit sequence, and
//! leading sequences on otherwise-meaningful lines (§4.1
//! `remove_sequential_numbers`).

/// Minimum run length of increasing integers before a line is considered
/// "dominated" by a sequence.
const MIN_RUN_LEN: usize = 5;
/// Minimum fraction of consecutive (`+1`) steps within the run.
const MIN_CONSECUTIVE_FRACTION: f64 = 0.7;

/// A token run extracted from a line: its 1- or 2-digit integer values and
/// the half-open byte range it spans.
struct NumberRun {
    values: Vec<u32>,
    start: usize,
    end: usize,
}

/// Tokenise `line` into whitespace-delimited words and collect the maximal
/// leading run of 1-2 digit integer tokens (allowing single non-digit
/// separators between them, since line-number stamps are often rendered as
/// `1 2 3 4 5` or `1. 2. 3. 4. 5.`).
fn leading_number_run(line: &str) -> Option<NumberRun> {
    let mut values = Vec::new();
    let mut end = 0usize;
    let mut cursor = 0usize;
    let bytes = line.as_bytes();

    loop {
        while cursor < bytes.len() && (bytes[cursor] as char).is_whitespace() {
            cursor += 1;
        }
        let digit_start = cursor;
        while cursor < bytes.len() && (bytes[cursor] as char).is_ascii_digit() {
            cursor += 1;
        }
        let digit_len = cursor - digit_start;
        if digit_len == 0 || digit_len > 2 {
            break;
        }
        let value: u32 = line[digit_start..cursor].parse().unwrap_or(0);
        values.push(value);
        end = cursor;
        // allow a single trailing punctuation separator (., ), :, -)
        if cursor < bytes.len() && matches!(bytes[cursor] as char, '.' | ')' | ':' | '-') {
            cursor += 1;
            end = cursor;
        }
    }

    if values.is_empty() {
        None
    } else {
        Some(NumberRun {
            values,
            start: 0,
            end,
        })
    }
}

/// Whether `run` qualifies as a dominating sequence per §4.1: at least
/// [`MIN_RUN_LEN`] integers, monotonically increasing overall, with at least
/// [`MIN_CONSECUTIVE_FRACTION`] of steps being exactly `+1`.
fn is_dominating_sequence(run: &NumberRun) -> bool {
    if run.values.len() < MIN_RUN_LEN {
        return false;
    }
    let mut consecutive_steps = 0usize;
    let mut increasing_steps = 0usize;
    for window in run.values.windows(2) {
        let (a, b) = (window[0], window[1]);
        if b > a {
            increasing_steps += 1;
        }
        if b == a + 1 {
            consecutive_steps += 1;
        }
    }
    let total_steps = run.values.len() - 1;
    if increasing_steps < total_steps {
        return false;
    }
    consecutive_steps as f64 / total_steps as f64 >= MIN_CONSECUTIVE_FRACTION
}

/// Strip lines dominated by a monotonically-increasing digit sequence, and
/// strip leading sequences on otherwise-meaningful lines.
#[must_use]
pub fn strip_sequential_numbers(text: &str) -> String {
    let mut out = Vec::new();
    for line in text.split('\n') {
        match leading_number_run(line) {
            Some(run) if is_dominating_sequence(&run) => {
                let remainder = line[run.end..].trim_start();
                if remainder.is_empty() {
                    // Line is nothing but the sequence: drop it entirely.
                    continue;
                }
                out.push(remainder.to_string());
            }
            _ => out.push(line.to_string()),
        }
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_line_that_is_only_a_sequence() {
        let input = "1 2 3 4 5 6\nActual content here";
        let out = strip_sequential_numbers(input);
        assert_eq!(out, "\nActual content here");
    }

    #[test]
    fn strips_leading_sequence_but_keeps_remainder() {
        let input = "1. 2. 3. 4. 5. The court finds as follows.";
        let out = strip_sequential_numbers(input);
        assert_eq!(out, "The court finds as follows.");
    }

    #[test]
    fn leaves_short_runs_untouched() {
        let input = "1 2 3 not enough numbers";
        assert_eq!(strip_sequential_numbers(input), input);
    }

    #[test]
    fn leaves_non_monotonic_runs_untouched() {
        let input = "5 3 1 4 2 shuffled numbers";
        assert_eq!(strip_sequential_numbers(input), input);
    }

    #[test]
    fn tolerates_occasional_skipped_number() {
        // 1,2,3,4,6,7,8 -> 6/7 steps consecutive (~0.857 >= 0.7), still increasing.
        let input = "1 2 3 4 6 7 8 remainder text";
        let out = strip_sequential_numbers(input);
        assert_eq!(out, "remainder text");
    }
}
