//! Dose schedule (`DoseTimesQtys`) handling
//!
//! The gateway expects a run of 9-character units, one per administration:
//! a 4-digit `HHMM` time followed by a 5-character quantity `QQ.QQ`
//! (`080001.00` = one unit at 08:00).

use regex::Regex;
use std::sync::LazyLock;

/// Width of one dose unit
pub const UNIT_WIDTH: usize = 9;

/// Default administration times used when a source only gives per-slot quantities
pub const DEFAULT_DOSE_TIMES: [&str; 4] = ["0800", "1200", "1800", "2100"];

static UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})\s?(\d{0,2}\.\d{1,2}|\d{1,2})").expect("static regex")
});

/// Largest quantity that fits the `QQ.QQ` field
pub const MAX_QUANTITY: f64 = 99.99;

/// Renders one dose unit, or `None` (logged) when the time is not four
/// digits or the quantity does not fit `QQ.QQ`
///
/// # Examples
///
/// ```
/// use pharmagate::core::transform::dose::format_unit;
///
/// assert_eq!(format_unit("0800", 1.0).as_deref(), Some("080001.00"));
/// assert_eq!(format_unit("2100", 12.5).as_deref(), Some("210012.50"));
/// assert_eq!(format_unit("0800", 100.0), None);
/// ```
pub fn format_unit(time: &str, quantity: f64) -> Option<String> {
    let time_ok = time.len() == 4 && time.bytes().all(|b| b.is_ascii_digit());
    // Rounding happens at two decimals, so 99.995 would render as 100.00
    let quantity_ok = (0.0..MAX_QUANTITY + 0.005).contains(&quantity);
    if !time_ok || !quantity_ok {
        tracing::warn!(time, quantity, "Dose unit does not fit HHMMQQ.QQ, dropped");
        return None;
    }
    Some(format!("{time}{quantity:05.2}"))
}

/// Brings a `DoseTimesQtys` value to a whole number of well-formed units.
///
/// Values that are already a multiple of [`UNIT_WIDTH`] are returned as-is.
/// Otherwise the value is split into `(time, quantity)` pairs and each pair
/// is re-rendered at full width, which restores the filler digit that short
/// quantities (`1.00` instead of `01.00`) drop. A value that does not split
/// cleanly into pairs is kept unchanged and logged.
pub fn rechunk(value: &str) -> String {
    let value = value.trim();
    if value.len() % UNIT_WIDTH == 0 {
        return value.to_string();
    }

    let deficit = UNIT_WIDTH - value.len() % UNIT_WIDTH;
    let leftover = UNIT.replace_all(value, "");
    let units: Option<String> = UNIT
        .captures_iter(value)
        .map(|cap| format_unit(&cap[1], cap[2].parse::<f64>().unwrap_or(0.0)))
        .collect();

    match units {
        Some(out) if !out.is_empty() && leftover.trim().is_empty() => {
            tracing::debug!(
                original = value,
                deficit,
                rechunked = %out,
                "Re-chunked dose schedule"
            );
            out
        }
        _ => {
            tracing::warn!(
                original = value,
                deficit,
                "Dose schedule could not be re-chunked, kept as received"
            );
            value.to_string()
        }
    }
}

/// Splits a well-formed value into `(time, quantity)` units
pub fn units(value: &str) -> Vec<(String, String)> {
    let value = rechunk(value);
    value
        .as_bytes()
        .chunks(UNIT_WIDTH)
        .filter(|c| c.len() == UNIT_WIDTH)
        .map(|c| {
            let text = String::from_utf8_lossy(c);
            (text[..4].to_string(), text[4..].to_string())
        })
        .collect()
}

/// Builds a dose schedule from a semicolon-delimited per-slot intake code
/// (`00;01;00;01`) against the four default administration times.
/// Zero, unparseable or oversized slots produce no entry.
pub fn from_intake_code(code: &str) -> String {
    code.split(';')
        .zip(DEFAULT_DOSE_TIMES)
        .filter_map(|(slot, time)| {
            let quantity = slot.trim().parse::<f64>().ok()?;
            if quantity > 0.0 {
                format_unit(time, quantity)
            } else {
                None
            }
        })
        .collect()
}
