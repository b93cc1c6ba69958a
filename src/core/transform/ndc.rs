//! NDC (National Drug Code) normalization

/// Placeholder written when a source carries no usable NDC
pub const NDC_PLACEHOLDER: &str = "00000000000";

/// Normalizes a raw NDC to the 11-digit form the gateway expects.
///
/// - 9 digits: the package code was dropped upstream; append `00`
/// - 10 or more characters: kept as-is, dashes included
/// - anything else (including empty or `0`): the 11-zero placeholder
///
/// Only surrounding whitespace is removed.
///
/// # Examples
///
/// ```
/// use pharmagate::core::transform::ndc::normalize_ndc;
///
/// assert_eq!(normalize_ndc("167140622"), "16714062200");
/// assert_eq!(normalize_ndc("16714-0622-01"), "16714-0622-01");
/// assert_eq!(normalize_ndc(""), "00000000000");
/// ```
pub fn normalize_ndc(raw: &str) -> String {
    let code = raw.trim();
    match code.len() {
        9 if code.bytes().all(|b| b.is_ascii_digit()) => format!("{code}00"),
        n if n > 9 => code.to_string(),
        _ => NDC_PLACEHOLDER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("167140622", "16714062200" ; "nine digits")]
    #[test_case("1671406220", "1671406220" ; "ten digits unchanged")]
    #[test_case("16714062201", "16714062201" ; "eleven digits unchanged")]
    #[test_case("16714-0622-01", "16714-0622-01" ; "dashed unchanged")]
    #[test_case(" 167140622 ", "16714062200" ; "padded nine digits")]
    #[test_case("1671-4062", NDC_PLACEHOLDER ; "nine characters with dash")]
    #[test_case("12345", NDC_PLACEHOLDER ; "short")]
    #[test_case("0", NDC_PLACEHOLDER ; "zero")]
    #[test_case("", NDC_PLACEHOLDER ; "empty")]
    fn test_normalize_ndc(input: &str, expected: &str) {
        assert_eq!(normalize_ndc(input), expected);
    }

    #[test]
    fn test_nine_digit_always_gains_two_zeros() {
        for code in ["000000000", "999999999", "123456789"] {
            let normalized = normalize_ndc(code);
            assert_eq!(normalized.len(), 11);
            assert!(normalized.starts_with(code));
            assert!(normalized.ends_with("00"));
        }
    }
}
