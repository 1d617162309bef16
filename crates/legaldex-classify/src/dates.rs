// SPDX-License-Identifier: MIT OR Apache-2.0
//! Date normalisation (§4.3 step 3): rewrites each free-text date a
//! provider returned into canonical ISO `YYYY-MM-DD`, dropping anything
//! that does not parse or falls outside the configured plausibility
//! window.

use chrono::{Datelike, NaiveDate, Weekday};
use legaldex_config::PlausibilityWindow;
use legaldex_core::RawDates;

const WEEKDAY_NAMES: &[(&str, Weekday)] = &[
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

/// Resolve `"next <weekday>"` relative to `now`: the nearest future
/// occurrence of that weekday, always at least one day ahead (so `"next
/// Monday"` said on a Monday means the Monday after, not today).
fn next_weekday_from(raw: &str, now: NaiveDate) -> Option<NaiveDate> {
    let rest = raw.to_ascii_lowercase();
    let rest = rest.strip_prefix("next ")?;
    let target = WEEKDAY_NAMES.iter().find(|(name, _)| *name == rest.trim())?.1;
    let mut days_ahead = (7 + target.num_days_from_monday() as i64 - now.weekday().num_days_from_monday() as i64) % 7;
    if days_ahead == 0 {
        days_ahead = 7;
    }
    now.checked_add_signed(chrono::Duration::days(days_ahead))
}

const MONTH_NAMES: &[(&str, u32)] = &[
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
];

/// Parse a free-text date in one of a few common formats. Returns `None`
/// if nothing recognisable is found.
#[must_use]
pub fn parse_date_flexible(raw: &str, now: NaiveDate) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%m/%d/%Y") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%B %d, %Y") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%b %d, %Y") {
        return Some(date);
    }

    match raw.to_ascii_lowercase().as_str() {
        "today" => return Some(now),
        "tomorrow" => return now.succ_opt(),
        "yesterday" => return now.pred_opt(),
        _ => {}
    }

    if let Some(date) = next_weekday_from(raw, now) {
        return Some(date);
    }

    parse_loose_month_day_year(raw)
}

fn parse_loose_month_day_year(raw: &str) -> Option<NaiveDate> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    let parts: Vec<&str> = cleaned.split_whitespace().collect();
    let [month_word, day_str, year_str] = parts.as_slice() else {
        return None;
    };
    let month = MONTH_NAMES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(month_word))
        .map(|(_, m)| *m)?;
    let day: u32 = day_str.parse().ok()?;
    let year: i32 = year_str.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Mutate every field of `dates` in place: parse it, check it against
/// `window`, and rewrite it to the canonical ISO string, or clear it to
/// `None` if it is unparseable or implausible (§4.3 step 3, §7 edge
/// cases).
pub fn normalize_dates(dates: &mut RawDates, window: &PlausibilityWindow, now: NaiveDate) {
    normalize_field("filing_date", &mut dates.filing_date, window, now);
    normalize_field("event_date", &mut dates.event_date, window, now);
    normalize_field("hearing_date", &mut dates.hearing_date, window, now);
    normalize_field("decision_date", &mut dates.decision_date, window, now);
    normalize_field("served_date", &mut dates.served_date, window, now);
}

fn normalize_field(
    label: &'static str,
    field: &mut Option<String>,
    window: &PlausibilityWindow,
    now: NaiveDate,
) {
    let Some(raw) = field.take() else {
        return;
    };
    match parse_date_flexible(&raw, now) {
        Some(date) if window.contains(date) => {
            *field = Some(date.format("%Y-%m-%d").to_string());
        }
        Some(date) => {
            tracing::warn!(target: "legaldex_classify::dates", %label, %raw, %date, "date outside plausibility window, dropping");
        }
        None => {
            tracing::warn!(target: "legaldex_classify::dates", %label, %raw, "unparseable date, dropping");
        }
    }
}
