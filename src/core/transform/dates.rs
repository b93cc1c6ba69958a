//! Date normalization
//!
//! Legacy sources write dates in dozens of shapes. Everything is normalized to
//! `YYYY-MM-DD`; anything unparseable becomes [`BAD_DATE`].

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

/// Marker written when no known pattern matches
pub const BAD_DATE: &str = "BADDATE";

const CANONICAL: &str = "%Y-%m-%d";

/// Date-only patterns, tried in order. Four-digit-year patterns precede their
/// two-digit twins; [`plausible`] rejects the short-year misparse.
const DATE_PATTERNS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m.%d.%Y",
    "%m/%d/%y",
    "%m-%d-%y",
    "%m.%d.%y",
    "%d-%b-%Y",
    "%d-%b-%y",
    "%d/%b/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%a, %b %d, %Y",
    "%A, %B %d, %Y",
    "%Y%b%d",
    "%d%b%Y",
];

/// Date-time patterns; the time part is discarded.
const DATETIME_PATTERNS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%y %H:%M",
    "%Y%m%d %H:%M:%S",
];

static COMPACT_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{6}|\d{8}|\d{12}|\d{14})$").expect("static regex"));

/// Normalizes a date string to `YYYY-MM-DD`.
///
/// Empty input stays empty. Already-canonical input is returned unchanged.
///
/// # Examples
///
/// ```
/// use pharmagate::core::transform::dates::normalize_date;
///
/// assert_eq!(normalize_date("01/05/2020"), "2020-01-05");
/// assert_eq!(normalize_date("2020-01-05"), "2020-01-05");
/// assert_eq!(normalize_date("not a date"), "BADDATE");
/// ```
pub fn normalize_date(raw: &str) -> String {
    let value = raw.trim();
    if value.is_empty() {
        return String::new();
    }

    parse_date(value)
        .map(|d| d.format(CANONICAL).to_string())
        .unwrap_or_else(|| {
            tracing::debug!(value, "Unrecognized date");
            BAD_DATE.to_string()
        })
}

/// Parses a legacy date with the ordered pattern list
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if COMPACT_DIGITS.is_match(value) {
        return parse_compact(value);
    }

    for pattern in DATE_PATTERNS {
        if let Ok(date) = NaiveDate::parse_from_str(value, pattern) {
            if plausible(&date) {
                return Some(date);
            }
        }
    }

    for pattern in DATETIME_PATTERNS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, pattern) {
            if plausible(&dt.date()) {
                return Some(dt.date());
            }
        }
    }

    None
}

/// All-digit forms: `YYYYMMDD`, `MMDDYYYY`, `MMDDYY`, `YYYYMMDDHHMM[SS]`.
/// Sliced explicitly because chrono's `%Y` is greedy over adjacent digits.
fn parse_compact(value: &str) -> Option<NaiveDate> {
    let num = |s: &str| s.parse::<u32>().ok();
    let candidates: Vec<(i32, u32, u32)> = match value.len() {
        6 => {
            let yy = num(&value[4..6])? as i32;
            vec![(expand_year(yy), num(&value[0..2])?, num(&value[2..4])?)]
        }
        8 => vec![
            (num(&value[0..4])? as i32, num(&value[4..6])?, num(&value[6..8])?),
            (num(&value[4..8])? as i32, num(&value[0..2])?, num(&value[2..4])?),
        ],
        12 | 14 => vec![(
            num(&value[0..4])? as i32,
            num(&value[4..6])?,
            num(&value[6..8])?,
        )],
        _ => vec![],
    };

    candidates
        .into_iter()
        .filter_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        .find(plausible)
}

/// Two-digit years pivot the same way chrono's `%y` does
fn expand_year(yy: i32) -> i32 {
    if yy < 70 {
        2000 + yy
    } else {
        1900 + yy
    }
}

fn plausible(date: &NaiveDate) -> bool {
    use chrono::Datelike;
    (1800..=2200).contains(&date.year())
}
