//! Legacy delimited decoder (schema generations V1 and V2)
//!
//! Records are `<tag><action>` followed by field-separated values and
//! terminated by a record separator. The same stream arrives in four
//! physical encodings which [`normalize`] folds into the binary form:
//!
//! | encoding | field sep | record sep |
//! |---|---|---|
//! | binary | `0xEE` | `0xE2` |
//! | plain text | `~` | `^` |
//! | hex digits | `EE` | `E2` |
//! | checksum | `~` or `0xEE` | `\d{10}S` trailer |

use super::{DecodeOptions, Decoded, Decoder, SkippedRecord};
use crate::core::mapping::{assign, FieldMap, Generation};
use crate::core::transform::{normalize_field, rechunk};
use crate::domain::{Action, InputFormat, PharmaGateError, Record, Result, TableType};
use regex::bytes::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Binary field separator
pub const FIELD_SEPARATOR: u8 = 0xEE;

/// Binary record separator
pub const RECORD_SEPARATOR: u8 = 0xE2;

/// `(tag, separator count)` pairs that identify a V1 record
pub const V1_SIGNATURES: [(TableType, usize); 5] = [
    (TableType::Prescriber, 17),
    (TableType::Drug, 21),
    (TableType::Location, 16),
    (TableType::Patient, 45),
    (TableType::Rx, 24),
];

pub(crate) static CHECKSUM_TRAILER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{10}S").expect("static regex"));

/// Folds any of the physical encodings into binary-separator form
pub fn normalize(raw: &[u8]) -> Cow<'_, [u8]> {
    if raw.contains(&RECORD_SEPARATOR) {
        return Cow::Borrowed(raw);
    }
    if raw.contains(&FIELD_SEPARATOR) {
        // Binary fields may still be terminated by checksum trailers
        return match CHECKSUM_TRAILER.replace_all(raw, &[RECORD_SEPARATOR][..]) {
            Cow::Borrowed(_) => Cow::Borrowed(raw),
            Cow::Owned(bytes) => Cow::Owned(bytes),
        };
    }

    let trimmed = raw.trim_ascii();
    if is_hex_stream(trimmed) {
        if let Ok(bytes) = hex::decode(trimmed) {
            tracing::debug!(bytes = bytes.len(), "Decoded hex delimited stream");
            return Cow::Owned(bytes);
        }
    }

    if !trimmed.ends_with(b"^") && CHECKSUM_TRAILER.is_match(trimmed) {
        let replaced = CHECKSUM_TRAILER.replace_all(trimmed, &[RECORD_SEPARATOR][..]);
        let mut bytes = replaced.into_owned();
        if !bytes.contains(&FIELD_SEPARATOR) {
            replace_byte(&mut bytes, b'~', FIELD_SEPARATOR);
        }
        return Cow::Owned(bytes);
    }

    let mut bytes = raw.to_vec();
    replace_byte(&mut bytes, b'~', FIELD_SEPARATOR);
    replace_byte(&mut bytes, b'^', RECORD_SEPARATOR);
    Cow::Owned(bytes)
}

fn is_hex_stream(bytes: &[u8]) -> bool {
    bytes.len() >= 4
        && bytes.len() % 2 == 0
        && bytes.iter().all(u8::is_ascii_hexdigit)
        && bytes.windows(2).any(|w| w.eq_ignore_ascii_case(b"EE"))
}

fn replace_byte(bytes: &mut [u8], from: u8, to: u8) {
    for b in bytes.iter_mut().filter(|b| **b == from) {
        *b = to;
    }
}

/// Splits normalized input into non-empty records
pub fn split_records(normalized: &[u8]) -> Vec<&[u8]> {
    normalized
        .split(|&b| b == RECORD_SEPARATOR)
        .map(<[u8]>::trim_ascii)
        .filter(|r| !r.is_empty())
        .collect()
}

/// Whether any record carries a V1 signature
pub fn is_v1(records: &[&[u8]]) -> bool {
    records.iter().any(|record| {
        let Some(table) = record.first().and_then(|&b| TableType::from_tag(b as char)) else {
            return false;
        };
        let separators = record.iter().filter(|&&b| b == FIELD_SEPARATOR).count();
        V1_SIGNATURES.contains(&(table, separators))
    })
}

/// Generation of a whole normalized document
pub fn generation(records: &[&[u8]]) -> Generation {
    if is_v1(records) {
        Generation::V1
    } else {
        Generation::V2
    }
}

/// Decodes one normalized record
pub fn decode_record(record: &[u8], generation: Generation) -> Result<Record> {
    let mut parts = record.split(|&b| b == FIELD_SEPARATOR);
    let header = parts.next().unwrap_or_default();

    let (tag, code) = match header {
        [tag, code, ..] => (*tag as char, *code as char),
        _ => {
            return Err(PharmaGateError::MalformedRecord(
                "record header shorter than tag and action".to_string(),
            ))
        }
    };
    let table = TableType::from_tag(tag)
        .ok_or_else(|| PharmaGateError::MalformedRecord(format!("unknown table tag '{tag}'")))?;
    let action = Action::from_code(code)
        .ok_or_else(|| PharmaGateError::MalformedRecord(format!("unknown action code '{code}'")))?;

    let mut out = Record::new(table, action);
    let map = FieldMap::for_table(table);
    let mut slots = map.slots(generation);
    let mut surplus = 0usize;

    for value in parts {
        let Some(slot) = slots.next() else {
            surplus += 1;
            continue;
        };
        let value = field_text(value);
        map_value(&mut out, slot.name, &value);
    }

    if surplus > 0 {
        tracing::trace!(table = %table, surplus, "Dropping surplus delimited fields");
    }
    Ok(out)
}

fn map_value(record: &mut Record, name: &str, value: &str) {
    match (record.table(), name) {
        (TableType::Prescriber, "DEA_ID") if value.contains('|') => {
            let (dea, npi) = value.split_once('|').unwrap_or((value, ""));
            assign(record, "DEA_ID", dea.trim());
            assign(record, "NPI", npi.trim());
        }
        (TableType::Rx, "DoseTimesQtys") => {
            assign(record, name, rechunk(value));
        }
        _ => {
            assign(record, name, normalize_field(name, value));
        }
    }
}

/// Field bytes as text: UTF-8 when valid, Latin-1 otherwise
fn field_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Decoder for the legacy delimited dialect
#[derive(Debug, Default, Clone, Copy)]
pub struct DelimitedDecoder;

impl Decoder for DelimitedDecoder {
    fn format(&self) -> InputFormat {
        InputFormat::Delimited
    }

    fn decode(&self, raw: &[u8], options: &DecodeOptions) -> Result<Decoded> {
        let normalized = normalize(raw);
        let records = split_records(&normalized);
        if records.is_empty() {
            return Err(PharmaGateError::MalformedRecord(
                "delimited input contains no records".to_string(),
            ));
        }

        let generation = generation(&records);
        tracing::debug!(records = records.len(), %generation, "Decoding delimited input");

        let mut queue = options.queue();
        let mut skipped = Vec::new();
        for (idx, bytes) in records.iter().enumerate() {
            match decode_record(bytes, generation) {
                Ok(record) => queue.push(record),
                Err(e) => skipped.push(SkippedRecord::new(self.format(), idx + 1, e.to_string())),
            }
        }

        if queue.is_empty() {
            return Err(PharmaGateError::MalformedRecord(format!(
                "none of {} delimited records could be decoded",
                records.len()
            )));
        }

        Ok(Decoded {
            transactions: vec![queue],
            skipped,
        })
    }
}
