//! Free-text drug name splitting
//!
//! Vendor exports carry the drug as one string (`ZOLPIDEM 10 MG TABLET`).
//! [`DrugName::parse_exact`] tries an ordered list of shapes; the first
//! that matches wins. The order is significant: several shapes overlap and
//! downstream systems rely on the resulting split.

use regex::Regex;
use std::sync::LazyLock;

static SHAPES: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        // NAME STRENGTH UNIT FORM
        r"(?i)^(\S+)\s+(\d+(?:\.\d+)?)\s+(\S+)\s+(.+)$",
        // TWO-WORD NAME STRENGTH UNIT FORM
        r"(?i)^(\S+\s+\S+)\s+(\d+(?:\.\d+)?)\s+(\S+)\s+(.+)$",
        // NAME 10MG FORM
        r"(?i)^(.+?)\s+(\d+(?:\.\d+)?)([a-z%]+)\s+(.+)$",
        // COMBO 5-325 MG FORM
        r"(?i)^([a-z0-9\-/ ]+?)\s+(\d+(?:\.\d+)?-\d+(?:\.\d+)?)\s*([a-z%]+)\s+(.+)$",
    ]
    .map(|pattern| Regex::new(pattern).expect("static regex"))
});

/// A drug name split into its parts
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DrugName {
    /// Trade or generic name
    pub name: String,
    /// Strength (`10`, `5-325`)
    pub strength: String,
    /// Unit (`MG`, `%`)
    pub unit: String,
    /// Dose form (`TABLET`)
    pub form: String,
}

impl DrugName {
    /// Splits `raw` with the ordered shape list, falling back to name-only
    ///
    /// # Examples
    ///
    /// ```
    /// use pharmagate::core::decoders::drug_name::DrugName;
    ///
    /// let drug = DrugName::parse_exact("ZOLPIDEM 10 MG TABLET");
    /// assert_eq!(drug.name, "ZOLPIDEM");
    /// assert_eq!(drug.strength, "10");
    /// assert_eq!(drug.unit, "MG");
    /// assert_eq!(drug.form, "TABLET");
    /// ```
    pub fn parse_exact(raw: &str) -> DrugName {
        let raw = raw.trim();
        for (shape, regex) in SHAPES.iter().enumerate() {
            if let Some(cap) = regex.captures(raw) {
                tracing::trace!(shape, "Drug name matched");
                return DrugName {
                    name: cap[1].trim().to_string(),
                    strength: cap[2].to_string(),
                    unit: cap[3].to_string(),
                    form: cap[4].trim().to_string(),
                };
            }
        }
        DrugName {
            name: raw.to_string(),
            ..DrugName::default()
        }
    }
}
