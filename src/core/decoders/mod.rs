//! Format decoders
//!
//! Every dialect implements [`Decoder`] independently; the dispatcher looks
//! decoders up by [`InputFormat`]. A decoder turns one input unit into one or
//! more [`WriteQueue`]s (one per transaction, in commit order) and reports
//! the records it had to skip.

pub mod delimited;
pub mod dispill;
pub mod drug_name;
pub mod fixed_width;
pub mod hl7;
pub mod json;
pub mod parada;
pub mod tagged;
pub mod xml;

use crate::core::commit::{TransactionFlags, WriteQueue};
use crate::domain::{InputFormat, Result};
use std::fmt;

/// Per-invocation decode settings
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Flags stamped onto every queue the decoder creates
    pub flags: TransactionFlags,
}

impl DecodeOptions {
    /// Fresh queue carrying these options' flags
    pub fn queue(&self) -> WriteQueue {
        WriteQueue::new(self.flags)
    }
}

/// A record the decoder could not map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// 1-based record/row number within the input
    pub position: usize,
    /// Why it was skipped
    pub reason: String,
}

impl SkippedRecord {
    /// Creates a skip entry and logs it
    pub fn new(format: InputFormat, position: usize, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        tracing::warn!(format = %format, position, reason = %reason, "Skipping record");
        Self { position, reason }
    }
}

impl fmt::Display for SkippedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record {}: {}", self.position, self.reason)
    }
}

/// Output of one decode
#[derive(Debug, Clone, Default)]
pub struct Decoded {
    /// Transactions in commit order
    pub transactions: Vec<WriteQueue>,
    /// Records dropped along the way
    pub skipped: Vec<SkippedRecord>,
}

impl Decoded {
    /// Single-transaction result
    pub fn single(queue: WriteQueue) -> Self {
        Self {
            transactions: vec![queue],
            skipped: Vec::new(),
        }
    }

    /// Total queued entries across all transactions
    pub fn record_count(&self) -> usize {
        self.transactions.iter().map(WriteQueue::len).sum()
    }
}

/// One input dialect
pub trait Decoder: Send + Sync {
    /// Format this decoder handles
    fn format(&self) -> InputFormat;

    /// Decodes one input unit
    ///
    /// # Errors
    ///
    /// Whole-unit structural problems (bad length, XML validation, nothing
    /// decodable) are errors; per-record problems in multi-record formats
    /// are reported through [`Decoded::skipped`].
    fn decode(&self, raw: &[u8], options: &DecodeOptions) -> Result<Decoded>;
}

/// Lossy text view used by the text dialects
pub(crate) fn text(raw: &[u8]) -> std::borrow::Cow<'_, str> {
    String::from_utf8_lossy(raw)
}
