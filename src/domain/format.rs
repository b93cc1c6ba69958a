//! Input dialects understood by the gateway

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Input format (explicit hint or heuristic classification)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// HL7 v2 messages, translated by an external collaborator
    Hl7,
    /// XML documents in canonical record shape
    Xml,
    /// JSON documents in canonical record shape
    Json,
    /// Canonical tagged text, passed through unchanged
    Tagged,
    /// Parada vendor rows (tilde-delimited, one row per dose)
    Parada,
    /// Legacy delimited format, generations V1 and V2
    Delimited,
    /// Dispill CSV-like export
    Dispill,
    /// MTS fixed-width binary layout
    Mts,
    /// OASIS / psEDI fixed-width binary layout
    Oasis,
}

impl InputFormat {
    /// All formats
    pub const ALL: [InputFormat; 9] = [
        InputFormat::Hl7,
        InputFormat::Xml,
        InputFormat::Json,
        InputFormat::Tagged,
        InputFormat::Parada,
        InputFormat::Delimited,
        InputFormat::Dispill,
        InputFormat::Mts,
        InputFormat::Oasis,
    ];

    /// Lower-case configuration name
    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Hl7 => "hl7",
            InputFormat::Xml => "xml",
            InputFormat::Json => "json",
            InputFormat::Tagged => "tagged",
            InputFormat::Parada => "parada",
            InputFormat::Delimited => "delimited",
            InputFormat::Dispill => "dispill",
            InputFormat::Mts => "mts",
            InputFormat::Oasis => "oasis",
        }
    }

    /// Parses an optional hint where `auto` (or empty) means "detect"
    pub fn parse_hint(s: &str) -> Result<Option<Self>, String> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
            return Ok(None);
        }
        trimmed.parse().map(Some)
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "psedi" => return Ok(InputFormat::Oasis),
            "mot" | "legacy" => return Ok(InputFormat::Delimited),
            _ => {}
        }
        InputFormat::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Unknown input format '{s}'. Expected one of: auto, {}",
                    InputFormat::ALL.map(|f| f.as_str()).join(", ")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        for format in InputFormat::ALL {
            assert_eq!(format.as_str().parse::<InputFormat>().unwrap(), format);
        }
        assert_eq!("psEDI".parse::<InputFormat>().unwrap(), InputFormat::Oasis);
        assert_eq!("MTS".parse::<InputFormat>().unwrap(), InputFormat::Mts);
        assert!("csv".parse::<InputFormat>().is_err());
    }

    #[test]
    fn test_parse_hint() {
        assert_eq!(InputFormat::parse_hint("auto").unwrap(), None);
        assert_eq!(InputFormat::parse_hint("").unwrap(), None);
        assert_eq!(
            InputFormat::parse_hint("dispill").unwrap(),
            Some(InputFormat::Dispill)
        );
        assert!(InputFormat::parse_hint("nope").is_err());
    }
}
