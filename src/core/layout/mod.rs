//! Binary layout reader
//!
//! Fixed-width sources are described declaratively: a [`BinaryLayout`] is a
//! flat, ordered table of `(field, offset, length, scalar type)` entries and
//! [`read_layout`] is the single decode function that walks it. Layouts are
//! data; adding a field means adding a row, not code.

pub mod mts;
pub mod oasis;

use chrono::{NaiveDate, NaiveTime};
use std::fmt;

/// Literal written when a date/time window does not match its pattern
pub const UNKNOWN_DATE_TIME: &str = "Unknown Date/Time";

/// Pattern for `date` windows (`mmDDyy`)
pub const DATE_PATTERN: &str = "%m%d%y";

/// Pattern for `time` windows (`HHmm`)
pub const TIME_PATTERN: &str = "%H%M";

/// Scalar type of a layout window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    /// ASCII/UTF-8 text, trimmed of padding
    String,
    /// 4-byte signed integer
    Int32,
    /// 2-byte signed integer
    Int16,
    /// 8-byte signed integer
    Int64,
    /// 4-byte IEEE float
    Float32,
    /// 8-byte IEEE float
    Float64,
    /// Single flag byte
    Bool,
    /// Text date, [`DATE_PATTERN`]
    Date,
    /// Text time, [`TIME_PATTERN`]
    Time,
}

impl ScalarType {
    /// Window width the type requires, if fixed
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            ScalarType::Int16 => Some(2),
            ScalarType::Int32 | ScalarType::Float32 => Some(4),
            ScalarType::Int64 | ScalarType::Float64 => Some(8),
            ScalarType::Bool => Some(1),
            ScalarType::String | ScalarType::Date | ScalarType::Time => None,
        }
    }
}

/// Byte order for numeric windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Least significant byte first
    Little,
    /// Most significant byte first
    Big,
}

/// One entry of a [`BinaryLayout`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutField {
    /// Field name (layout-local, not necessarily canonical)
    pub name: &'static str,
    /// Byte offset within the record
    pub offset: usize,
    /// Window length in bytes
    pub length: usize,
    /// How to interpret the window
    pub scalar: ScalarType,
}

impl LayoutField {
    /// `const` constructor used by the layout tables
    pub const fn new(name: &'static str, offset: usize, length: usize, scalar: ScalarType) -> Self {
        Self {
            name,
            offset,
            length,
            scalar,
        }
    }
}

/// A fixed-width record layout
#[derive(Debug, Clone, Copy)]
pub struct BinaryLayout {
    /// Human-readable layout name, used in errors and logs
    pub name: &'static str,
    /// Size of one record in bytes
    pub record_size: usize,
    /// Byte order of numeric windows
    pub byte_order: ByteOrder,
    /// Field table, ordered by offset
    pub fields: &'static [LayoutField],
}

impl BinaryLayout {
    /// Number of whole records in `len` bytes, or `None` when `len` is not an
    /// exact non-zero multiple of the record size
    pub fn record_count(&self, len: usize) -> Option<usize> {
        (len > 0 && len % self.record_size == 0).then(|| len / self.record_size)
    }

    /// Looks up a field definition
    pub fn field(&self, name: &str) -> Option<&LayoutField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A decoded window
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// Text
    Text(String),
    /// Any integer width, widened
    Int(i64),
    /// Any float width, widened
    Float(f64),
    /// Flag
    Bool(bool),
    /// Date; `None` when the window did not match [`DATE_PATTERN`]
    Date(Option<NaiveDate>),
    /// Time; `None` when the window did not match [`TIME_PATTERN`]
    Time(Option<NaiveTime>),
    /// The window fell outside the buffer
    Missing,
}

impl ScalarValue {
    /// Renders the value the way it is written into a gateway field
    pub fn to_field_string(&self) -> String {
        match self {
            ScalarValue::Text(s) => s.clone(),
            ScalarValue::Int(v) => v.to_string(),
            ScalarValue::Float(v) => {
                if v.fract() == 0.0 {
                    format!("{v:.0}")
                } else {
                    v.to_string()
                }
            }
            ScalarValue::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            ScalarValue::Date(Some(d)) => d.format("%Y-%m-%d").to_string(),
            ScalarValue::Time(Some(t)) => t.format("%H%M").to_string(),
            ScalarValue::Date(None) | ScalarValue::Time(None) => UNKNOWN_DATE_TIME.to_string(),
            ScalarValue::Missing => String::new(),
        }
    }

    /// Numeric view, when the value is numeric
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Int(v) => Some(*v as f64),
            ScalarValue::Float(v) => Some(*v),
            ScalarValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_field_string())
    }
}

/// One decoded fixed-width record, in layout order
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRecord {
    values: Vec<(&'static str, ScalarValue)>,
}

impl LayoutRecord {
    /// Value of a named field
    pub fn get(&self, name: &str) -> Option<&ScalarValue> {
        self.values.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Field rendered as a gateway string; empty when absent
    pub fn text(&self, name: &str) -> String {
        self.get(name)
            .map(ScalarValue::to_field_string)
            .unwrap_or_default()
    }

    /// All values in layout order
    pub fn values(&self) -> &[(&'static str, ScalarValue)] {
        &self.values
    }
}

/// Decodes one record from `buffer` according to `layout`.
///
/// Every window is bounds-checked; windows that fall outside the buffer
/// decode to [`ScalarValue::Missing`] rather than failing the record.
pub fn read_layout(buffer: &[u8], layout: &BinaryLayout) -> LayoutRecord {
    let values = layout
        .fields
        .iter()
        .map(|field| {
            let value = buffer
                .get(field.offset..field.offset + field.length)
                .map(|window| read_scalar(window, field.scalar, layout.byte_order))
                .unwrap_or(ScalarValue::Missing);
            (field.name, value)
        })
        .collect();
    LayoutRecord { values }
}

/// Splits `buffer` into whole records of `layout.record_size` bytes
pub fn records<'a>(buffer: &'a [u8], layout: &BinaryLayout) -> impl Iterator<Item = &'a [u8]> {
    buffer.chunks_exact(layout.record_size)
}

fn read_scalar(window: &[u8], scalar: ScalarType, order: ByteOrder) -> ScalarValue {
    match scalar {
        ScalarType::String => ScalarValue::Text(read_text(window)),
        ScalarType::Int16 => fixed::<2>(window)
            .map(|b| match order {
                ByteOrder::Little => i16::from_le_bytes(b),
                ByteOrder::Big => i16::from_be_bytes(b),
            })
            .map_or(ScalarValue::Missing, |v| ScalarValue::Int(v as i64)),
        ScalarType::Int32 => fixed::<4>(window)
            .map(|b| match order {
                ByteOrder::Little => i32::from_le_bytes(b),
                ByteOrder::Big => i32::from_be_bytes(b),
            })
            .map_or(ScalarValue::Missing, |v| ScalarValue::Int(v as i64)),
        ScalarType::Int64 => fixed::<8>(window)
            .map(|b| match order {
                ByteOrder::Little => i64::from_le_bytes(b),
                ByteOrder::Big => i64::from_be_bytes(b),
            })
            .map_or(ScalarValue::Missing, ScalarValue::Int),
        ScalarType::Float32 => fixed::<4>(window)
            .map(|b| match order {
                ByteOrder::Little => f32::from_le_bytes(b),
                ByteOrder::Big => f32::from_be_bytes(b),
            })
            .map_or(ScalarValue::Missing, |v| ScalarValue::Float(v as f64)),
        ScalarType::Float64 => fixed::<8>(window)
            .map(|b| match order {
                ByteOrder::Little => f64::from_le_bytes(b),
                ByteOrder::Big => f64::from_be_bytes(b),
            })
            .map_or(ScalarValue::Missing, ScalarValue::Float),
        ScalarType::Bool => ScalarValue::Bool(matches!(
            window.first().map(u8::to_ascii_uppercase),
            Some(1 | b'1' | b'Y' | b'T')
        )),
        ScalarType::Date => {
            ScalarValue::Date(NaiveDate::parse_from_str(&read_text(window), DATE_PATTERN).ok())
        }
        ScalarType::Time => {
            ScalarValue::Time(NaiveTime::parse_from_str(&read_text(window), TIME_PATTERN).ok())
        }
    }
}

fn fixed<const N: usize>(window: &[u8]) -> Option<[u8; N]> {
    window.get(..N)?.try_into().ok()
}

fn read_text(window: &[u8]) -> String {
    String::from_utf8_lossy(window)
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}

#[cfg(test)]
pub(crate) mod testing {
    //! Test-only encoder: the inverse of [`read_layout`] for building fixtures.

    use super::*;

    /// Writes values into a zero-filled (space-padded for text) record buffer
    pub fn encode(layout: &BinaryLayout, values: &[(&str, ScalarValue)]) -> Vec<u8> {
        let mut buf = vec![b' '; layout.record_size];
        for field in layout.fields {
            if field.scalar.fixed_width().is_some() {
                buf[field.offset..field.offset + field.length].fill(0);
            }
        }
        for (name, value) in values {
            let field = layout
                .field(name)
                .unwrap_or_else(|| panic!("{name} not in {}", layout.name));
            let window = &mut buf[field.offset..field.offset + field.length];
            let bytes: Vec<u8> = match (value, field.scalar, layout.byte_order) {
                (ScalarValue::Text(s), _, _) => s.as_bytes().to_vec(),
                (ScalarValue::Int(v), ScalarType::Int16, ByteOrder::Little) => {
                    (*v as i16).to_le_bytes().to_vec()
                }
                (ScalarValue::Int(v), ScalarType::Int16, ByteOrder::Big) => {
                    (*v as i16).to_be_bytes().to_vec()
                }
                (ScalarValue::Int(v), ScalarType::Int32, ByteOrder::Little) => {
                    (*v as i32).to_le_bytes().to_vec()
                }
                (ScalarValue::Int(v), ScalarType::Int32, ByteOrder::Big) => {
                    (*v as i32).to_be_bytes().to_vec()
                }
                (ScalarValue::Int(v), ScalarType::Int64, ByteOrder::Little) => {
                    v.to_le_bytes().to_vec()
                }
                (ScalarValue::Int(v), ScalarType::Int64, ByteOrder::Big) => {
                    v.to_be_bytes().to_vec()
                }
                (ScalarValue::Float(v), ScalarType::Float32, ByteOrder::Little) => {
                    (*v as f32).to_le_bytes().to_vec()
                }
                (ScalarValue::Float(v), ScalarType::Float32, ByteOrder::Big) => {
                    (*v as f32).to_be_bytes().to_vec()
                }
                (ScalarValue::Float(v), ScalarType::Float64, ByteOrder::Little) => {
                    v.to_le_bytes().to_vec()
                }
                (ScalarValue::Float(v), ScalarType::Float64, ByteOrder::Big) => {
                    v.to_be_bytes().to_vec()
                }
                (ScalarValue::Bool(b), _, _) => vec![if *b { b'Y' } else { b'N' }],
                (other, scalar, _) => panic!("cannot encode {other:?} as {scalar:?}"),
            };
            let n = bytes.len().min(window.len());
            window[..n].copy_from_slice(&bytes[..n]);
        }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::testing::encode;
    use super::*;

    const TINY: &[LayoutField] = &[
        LayoutField::new("name", 0, 8, ScalarType::String),
        LayoutField::new("count", 8, 4, ScalarType::Int32),
        LayoutField::new("short", 12, 2, ScalarType::Int16),
        LayoutField::new("big", 14, 8, ScalarType::Int64),
        LayoutField::new("ratio", 22, 4, ScalarType::Float32),
        LayoutField::new("precise", 26, 8, ScalarType::Float64),
        LayoutField::new("flag", 34, 1, ScalarType::Bool),
        LayoutField::new("when", 35, 6, ScalarType::Date),
        LayoutField::new("at", 41, 4, ScalarType::Time),
    ];

    const TINY_LE: BinaryLayout = BinaryLayout {
        name: "tiny",
        record_size: 45,
        byte_order: ByteOrder::Little,
        fields: TINY,
    };

    const TINY_BE: BinaryLayout = BinaryLayout {
        byte_order: ByteOrder::Big,
        ..TINY_LE
    };

    fn sample(layout: &BinaryLayout) -> Vec<u8> {
        encode(
            layout,
            &[
                ("name", ScalarValue::Text("ASPIRIN".into())),
                ("count", ScalarValue::Int(-42)),
                ("short", ScalarValue::Int(7)),
                ("big", ScalarValue::Int(1 << 40)),
                ("ratio", ScalarValue::Float(0.5)),
                ("precise", ScalarValue::Float(2.25)),
                ("flag", ScalarValue::Bool(true)),
                ("when", ScalarValue::Text("010520".into())),
                ("at", ScalarValue::Text("2100".into())),
            ],
        )
    }

    #[test]
    fn test_read_all_scalar_types_both_orders() {
        for layout in [&TINY_LE, &TINY_BE] {
            let record = read_layout(&sample(layout), layout);
            assert_eq!(record.text("name"), "ASPIRIN");
            assert_eq!(record.get("count"), Some(&ScalarValue::Int(-42)));
            assert_eq!(record.get("short"), Some(&ScalarValue::Int(7)));
            assert_eq!(record.get("big"), Some(&ScalarValue::Int(1 << 40)));
            assert_eq!(record.get("ratio"), Some(&ScalarValue::Float(0.5)));
            assert_eq!(record.get("precise"), Some(&ScalarValue::Float(2.25)));
            assert_eq!(record.get("flag"), Some(&ScalarValue::Bool(true)));
            assert_eq!(record.text("when"), "2020-01-05");
            assert_eq!(record.text("at"), "2100");
        }
    }

    #[test]
    fn test_byte_order_is_explicit() {
        let le = sample(&TINY_LE);
        let misread = read_layout(&le, &TINY_BE);
        assert_ne!(misread.get("count"), Some(&ScalarValue::Int(-42)));
    }

    #[test]
    fn test_bad_date_time_fall_back_to_literal() {
        let buf = encode(
            &TINY_LE,
            &[
                ("when", ScalarValue::Text("13XX20".into())),
                ("at", ScalarValue::Text("9999".into())),
            ],
        );
        let record = read_layout(&buf, &TINY_LE);
        assert_eq!(record.text("when"), UNKNOWN_DATE_TIME);
        assert_eq!(record.text("at"), UNKNOWN_DATE_TIME);
    }

    #[test]
    fn test_short_buffer_yields_missing() {
        let record = read_layout(b"ASPIRIN", &TINY_LE);
        assert_eq!(record.get("name"), Some(&ScalarValue::Missing));
        assert_eq!(record.text("count"), "");
    }

    #[test]
    fn test_record_count() {
        assert_eq!(TINY_LE.record_count(90), Some(2));
        assert_eq!(TINY_LE.record_count(91), None);
        assert_eq!(TINY_LE.record_count(0), None);
    }

    #[test]
    fn test_layout_windows_do_not_overlap() {
        for layout in [&mts::MTS_LAYOUT, &oasis::OASIS_LAYOUT] {
            let mut end = 0;
            for field in layout.fields {
                assert!(field.offset >= end, "{} overlaps in {}", field.name, layout.name);
                if let Some(width) = field.scalar.fixed_width() {
                    assert_eq!(field.length, width, "{} width", field.name);
                }
                end = field.offset + field.length;
            }
            assert_eq!(end, layout.record_size, "{} trailing bytes", layout.name);
        }
    }
}
