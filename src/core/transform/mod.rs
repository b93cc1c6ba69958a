//! Field-level normalization shared by the decoders
//!
//! - [`dates`]: ~30 legacy date shapes to `YYYY-MM-DD` (or `BADDATE`)
//! - [`ndc`]: drug codes to 11 digits
//! - [`dose`]: `DoseTimesQtys` units and intake codes

pub mod dates;
pub mod dose;
pub mod ndc;

pub use dates::{normalize_date, BAD_DATE};
pub use dose::{format_unit, from_intake_code, rechunk};
pub use ndc::{normalize_ndc, NDC_PLACEHOLDER};

/// Whether a canonical field name holds a date and must be normalized
pub fn is_date_field(name: &str) -> bool {
    name.to_ascii_uppercase().contains("DATE")
}

/// Applies the per-field rules every mapped value goes through:
/// date normalization for `*DATE*` fields, `Status` defaulting to `1`.
pub fn normalize_field(name: &str, value: &str) -> String {
    let value = value.trim();
    if is_date_field(name) {
        return normalize_date(value);
    }
    if value.is_empty() && name.eq_ignore_ascii_case("status") {
        return "1".to_string();
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_date_field() {
        assert!(is_date_field("RxStartDate"));
        assert!(is_date_field("CycleDate"));
        assert!(is_date_field("AnchorDate"));
        assert!(!is_date_field("DOB"));
        assert!(!is_date_field("Sig"));
    }

    #[test]
    fn test_normalize_field() {
        assert_eq!(normalize_field("RxStopDate", "1/5/2020"), "2020-01-05");
        assert_eq!(normalize_field("Status", ""), "1");
        assert_eq!(normalize_field("STATUS", " "), "1");
        assert_eq!(normalize_field("Status", "0"), "0");
        assert_eq!(normalize_field("Sig", "  TAKE ONE  "), "TAKE ONE");
    }
}
