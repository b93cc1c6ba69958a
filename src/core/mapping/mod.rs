//! Field mapping tables
//!
//! Immutable, per-table, per-generation positional maps from a slot in a
//! legacy record to a canonical gateway field name. The maps double as the
//! canonical field set of each table: decoders assign values through
//! [`assign`], which silently drops names a table does not define.

mod tables;

use crate::domain::{Record, TableType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Legacy delimited schema generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Generation {
    /// Oldest generation; omits the V2-only slots
    V1,
    /// Current generation; superset of V1
    V2,
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Generation::V1 => f.write_str("V1"),
            Generation::V2 => f.write_str("V2"),
        }
    }
}

/// One positional slot of a [`FieldMap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSlot {
    /// 1-based position within the V2 layout
    pub position: usize,
    /// Canonical field name
    pub name: &'static str,
    /// Whether the slot exists in V1 input
    pub present_in_v1: bool,
}

/// Ordered positional map for one table
#[derive(Debug, Clone, Copy)]
pub struct FieldMap {
    table: TableType,
    entries: &'static [(&'static str, bool)],
    extras: &'static [&'static str],
}

impl FieldMap {
    /// Map for the given table
    pub fn for_table(table: TableType) -> FieldMap {
        let (entries, extras) = match table {
            TableType::Store => (tables::STORE, tables::NO_EXTRA),
            TableType::Location => (tables::LOCATION, tables::NO_EXTRA),
            TableType::Prescriber => (tables::PRESCRIBER, tables::PRESCRIBER_EXTRA),
            TableType::Drug => (tables::DRUG, tables::NO_EXTRA),
            TableType::Patient => (tables::PATIENT, tables::NO_EXTRA),
            TableType::Rx => (tables::RX, tables::NO_EXTRA),
            TableType::TimesQtys => (tables::TIMES_QTYS, tables::NO_EXTRA),
        };
        FieldMap {
            table,
            entries,
            extras,
        }
    }

    /// Table this map describes
    pub fn table(&self) -> TableType {
        self.table
    }

    /// Slots in positional order for the given generation
    pub fn slots(&self, generation: Generation) -> impl Iterator<Item = FieldSlot> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(idx, &(name, present_in_v1))| FieldSlot {
                position: idx + 1,
                name,
                present_in_v1,
            })
            .filter(move |slot| generation == Generation::V2 || slot.present_in_v1)
    }

    /// Number of positional slots in the given generation
    pub fn field_count(&self, generation: Generation) -> usize {
        self.slots(generation).count()
    }

    /// Whether `name` belongs to this table's canonical field set
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| *n == name) || self.extras.contains(&name)
    }

    /// Canonical field set: positional names followed by non-positional extras
    pub fn canonical_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries
            .iter()
            .map(|(n, _)| *n)
            .chain(self.extras.iter().copied())
    }
}

/// Sets `name` on `record` when it is canonical for the record's table.
///
/// Returns `false` (and drops the value) for unknown columns.
pub fn assign(record: &mut Record, name: &str, value: impl Into<String>) -> bool {
    if FieldMap::for_table(record.table()).contains(name) {
        record.set(name, value);
        true
    } else {
        tracing::trace!(
            table = %record.table(),
            field = name,
            "Dropping non-canonical field"
        );
        false
    }
}

/// Like [`assign`], but skips empty values so sparse sources don't emit
/// blank elements.
pub fn assign_non_empty(record: &mut Record, name: &str, value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    assign(record, name, value)
}
