//! Heuristic format classification
//!
//! Rules are tried in order and the first match wins. There is no scoring and
//! no backtracking: an input that trips an early rule is never reconsidered
//! for a later one, even if the chosen decoder then fails. Dispill, MTS and
//! OASIS have no signature and need an explicit format hint.

use crate::core::decoders::delimited::{CHECKSUM_TRAILER, FIELD_SEPARATOR, RECORD_SEPARATOR};
use crate::domain::InputFormat;
use std::fmt;

/// Which rule classified an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Detected format
    pub format: InputFormat,
    /// 1-based rule number
    pub rule: usize,
    /// What the rule looks for
    pub signature: &'static str,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (rule {}: {})", self.format, self.rule, self.signature)
    }
}

type Rule = (InputFormat, &'static str, fn(&Sample) -> bool);

const RULES: [Rule; 9] = [
    (InputFormat::Hl7, "HL7 segment marker", is_hl7),
    (InputFormat::Xml, "XML prolog", is_xml),
    (InputFormat::Json, "JSON object", is_json),
    (InputFormat::Tagged, "canonical tagged record", is_tagged),
    (InputFormat::Parada, "tilde + carriage return row end", is_parada),
    (InputFormat::Delimited, "binary separators", has_binary_separators),
    (InputFormat::Delimited, "tilde fields, caret terminator", is_plain_delimited),
    (InputFormat::Delimited, "hex-encoded separators", is_hex_delimited),
    (InputFormat::Delimited, "checksum record trailer", has_checksum_trailer),
];

fn is_hl7(p: &Sample) -> bool {
    p.contains(b"MSH") || p.contains(b"|^~\\&")
}

fn is_xml(p: &Sample) -> bool {
    p.contains(b"<?") && p.contains_ci(b"xml")
}

fn is_json(p: &Sample) -> bool {
    p.contains(b"{") && p.contains(b":")
}

fn is_tagged(p: &Sample) -> bool {
    p.contains_ci(b"<record>") && p.contains_ci(b"<table>")
}

fn is_parada(p: &Sample) -> bool {
    p.contains(b"~\r")
}

fn has_binary_separators(p: &Sample) -> bool {
    p.raw.contains(&FIELD_SEPARATOR) && p.raw.contains(&RECORD_SEPARATOR)
}

fn is_plain_delimited(p: &Sample) -> bool {
    p.contains(b"~") && p.tail().ends_with(b"^")
}

fn is_hex_delimited(p: &Sample) -> bool {
    p.contains(b"EEEE") && p.tail().ends_with(b"E2")
}

fn has_checksum_trailer(p: &Sample) -> bool {
    CHECKSUM_TRAILER.is_match(p.raw)
}

struct Sample<'a> {
    raw: &'a [u8],
    lower: Vec<u8>,
}

impl<'a> Sample<'a> {
    fn new(raw: &'a [u8]) -> Self {
        Self {
            raw,
            lower: raw.to_ascii_lowercase(),
        }
    }

    fn contains(&self, needle: &[u8]) -> bool {
        find(self.raw, needle)
    }

    /// `needle` must be lower-case
    fn contains_ci(&self, needle: &[u8]) -> bool {
        find(&self.lower, needle)
    }

    fn tail(&self) -> &[u8] {
        self.raw.trim_ascii_end()
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Classifies `raw`, or returns `None` when no rule matches
pub fn classify(raw: &[u8]) -> Option<Classification> {
    let sample = Sample::new(raw);
    RULES
        .iter()
        .enumerate()
        .find(|(_, (_, _, matches))| matches(&sample))
        .map(|(idx, &(format, signature, _))| Classification {
            format,
            rule: idx + 1,
            signature,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(b"MSH|^~\\&|PHARM|" as &[u8], InputFormat::Hl7, 1 ; "hl7 msh")]
    #[test_case(b"<?xml version=\"1.0\"?><Record/>", InputFormat::Xml, 2 ; "xml prolog")]
    #[test_case(b"<?XML version=\"1.0\"?>", InputFormat::Xml, 2 ; "xml upper case")]
    #[test_case(b"{\"Table\": \"Rx\"}", InputFormat::Json, 3 ; "json")]
    #[test_case(b"<RECORD><Table>Store</Table></RECORD>", InputFormat::Tagged, 4 ; "tagged")]
    #[test_case(b"F1~Sunrise~P1~\r\n", InputFormat::Parada, 5 ; "parada")]
    #[test_case(b"PA\xEE1\xEEDOE\xE2", InputFormat::Delimited, 6 ; "binary delimited")]
    #[test_case(b"PA~1~DOE^\n", InputFormat::Delimited, 7 ; "plain delimited")]
    #[test_case(b"5041EE31EEEE444F45E2", InputFormat::Delimited, 8 ; "hex delimited")]
    #[test_case(b"PA 1 DOE0123456789S", InputFormat::Delimited, 9 ; "checksum delimited")]
    fn test_rules(raw: &[u8], format: InputFormat, rule: usize) {
        let classification = classify(raw).unwrap();
        assert_eq!(classification.format, format);
        assert_eq!(classification.rule, rule);
    }

    #[test]
    fn test_first_rule_wins() {
        // JSON carrying an HL7 message is still HL7
        let raw = br#"{"message": "MSH|^~\&|RX"}"#;
        assert_eq!(classify(raw).unwrap().format, InputFormat::Hl7);

        // Tagged text with an XML prolog goes to the XML decoder
        let raw = b"<?xml version=\"1.0\"?><Record><Table>Rx</Table></Record>";
        assert_eq!(classify(raw).unwrap().format, InputFormat::Xml);
    }

    #[test]
    fn test_unidentified() {
        assert_eq!(classify(b"P1001,DOE,JANE\n"), None);
        assert_eq!(classify(b""), None);
        assert_eq!(classify(&[0u8; 2566]), None);
    }
}
