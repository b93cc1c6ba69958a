//! Canonical gateway record
//!
//! Every decoder converges on [`Record`]: a table tag, an action tag and an
//! ordered list of named fields. Its wire form is the canonical tagged text
//! the gateway consumes:
//!
//! ```text
//! <Record><Table>Rx</Table><Action>Add</Action><RxSys_RxNum>8880394</RxSys_RxNum></Record>
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Gateway table a record targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableType {
    /// Patient demographics
    Patient,
    /// Prescriber (doctor)
    Prescriber,
    /// Drug catalogue entry
    Drug,
    /// Prescription
    Rx,
    /// Pharmacy / store
    Store,
    /// Facility / location
    Location,
    /// Named dose schedule
    TimesQtys,
}

impl TableType {
    /// All table types, in the order the gateway documents them
    pub const ALL: [TableType; 7] = [
        TableType::Store,
        TableType::Location,
        TableType::Prescriber,
        TableType::Patient,
        TableType::Drug,
        TableType::Rx,
        TableType::TimesQtys,
    ];

    /// Wire name used inside `<Table>`
    pub fn as_str(&self) -> &'static str {
        match self {
            TableType::Patient => "Patient",
            TableType::Prescriber => "Prescriber",
            TableType::Drug => "Drug",
            TableType::Rx => "Rx",
            TableType::Store => "Store",
            TableType::Location => "Location",
            TableType::TimesQtys => "TimesQtys",
        }
    }

    /// Resolves the single-character tag used by the delimited format
    pub fn from_tag(tag: char) -> Option<Self> {
        match tag.to_ascii_uppercase() {
            'P' => Some(TableType::Patient),
            'D' => Some(TableType::Prescriber),
            'G' => Some(TableType::Drug),
            'R' => Some(TableType::Rx),
            'S' => Some(TableType::Store),
            'L' => Some(TableType::Location),
            'T' => Some(TableType::TimesQtys),
            _ => None,
        }
    }

    /// Single-character delimited-format tag
    pub fn tag(&self) -> char {
        match self {
            TableType::Patient => 'P',
            TableType::Prescriber => 'D',
            TableType::Drug => 'G',
            TableType::Rx => 'R',
            TableType::Store => 'S',
            TableType::Location => 'L',
            TableType::TimesQtys => 'T',
        }
    }
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TableType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown table type: {s}"))
    }
}

/// Operation the gateway applies to a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Action {
    /// Insert
    #[default]
    Add,
    /// Update
    Change,
    /// Remove
    Delete,
}

impl Action {
    /// Wire name used inside `<Action>`
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Add => "Add",
            Action::Change => "Change",
            Action::Delete => "Delete",
        }
    }

    /// Resolves the single-character action code (`A`, `C`, `D`, any case)
    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'A' => Some(Action::Add),
            'C' => Some(Action::Change),
            'D' => Some(Action::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A canonical gateway record
///
/// Field names are unique; setting an existing name replaces its value in
/// place so insertion order is stable for serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    table: TableType,
    action: Action,
    fields: Vec<(String, String)>,
}

impl Record {
    /// Creates an empty record
    pub fn new(table: TableType, action: Action) -> Self {
        Self {
            table,
            action,
            fields: Vec::new(),
        }
    }

    /// Table tag
    pub fn table(&self) -> TableType {
        self.table
    }

    /// Action tag
    pub fn action(&self) -> Action {
        self.action
    }

    /// Sets a field, replacing any previous value under the same name
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Builder-style [`Record::set`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Looks up a field value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Removes a field, returning its value
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self.fields.iter().position(|(n, _)| n == name)?;
        Some(self.fields.remove(idx).1)
    }

    /// Fields in insertion order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Serializes the record as canonical tagged text
    pub fn to_tagged(&self) -> String {
        let mut out = String::with_capacity(64 + self.fields.len() * 32);
        out.push_str("<Record><Table>");
        out.push_str(self.table.as_str());
        out.push_str("</Table><Action>");
        out.push_str(self.action.as_str());
        out.push_str("</Action>");
        for (name, value) in &self.fields {
            push_element(&mut out, name, value);
        }
        out.push_str("</Record>");
        out
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_tagged())
    }
}

/// Appends `<name>escaped value</name>`
pub(crate) fn push_element(out: &mut String, name: &str, value: &str) {
    out.push('<');
    out.push_str(name);
    out.push('>');
    escape_into(out, value);
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Escapes the three characters that would break the tagged framing
pub(crate) fn escape_into(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
