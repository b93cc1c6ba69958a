//! Write queue: one atomic gateway transaction

use crate::config::{CommitMode, GatewayConfig};
use crate::domain::Record;
use std::borrow::Cow;
use uuid::Uuid;

/// Transaction flags copied onto every queue a decoder creates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionFlags {
    /// Emit the end-of-stream marker after the last record
    pub send_eof: bool,
    /// Log every serialized record before writing it
    pub debug_logging: bool,
    /// Wire framing
    pub commit_mode: CommitMode,
}

impl Default for TransactionFlags {
    fn default() -> Self {
        Self {
            send_eof: true,
            debug_logging: false,
            commit_mode: CommitMode::Batch,
        }
    }
}

impl From<&GatewayConfig> for TransactionFlags {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            send_eof: config.send_eof,
            debug_logging: config.debug_logging,
            commit_mode: config.commit_mode,
        }
    }
}

/// One queued item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEntry {
    /// A structured record, serialized at commit time
    Record(Record),
    /// Canonical tagged text that is forwarded byte-for-byte
    Tagged(String),
}

impl QueueEntry {
    /// Wire form of the entry
    pub fn to_wire(&self) -> Cow<'_, str> {
        match self {
            QueueEntry::Record(record) => Cow::Owned(record.to_tagged()),
            QueueEntry::Tagged(text) => Cow::Borrowed(text),
        }
    }

    /// The structured record, when this entry has one
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            QueueEntry::Record(record) => Some(record),
            QueueEntry::Tagged(_) => None,
        }
    }
}

/// Ordered records destined for a single commit
///
/// Created per logical document, filled by one decoder invocation, flushed
/// once by the committer and then dropped.
#[derive(Debug, Clone)]
pub struct WriteQueue {
    transaction_id: Uuid,
    flags: TransactionFlags,
    entries: Vec<QueueEntry>,
}

impl WriteQueue {
    /// Creates an empty queue with a fresh transaction id
    pub fn new(flags: TransactionFlags) -> Self {
        Self {
            transaction_id: Uuid::new_v4(),
            flags,
            entries: Vec::new(),
        }
    }

    /// Appends a structured record
    pub fn push(&mut self, record: Record) {
        self.entries.push(QueueEntry::Record(record));
    }

    /// Appends pre-serialized canonical text
    pub fn push_tagged(&mut self, text: impl Into<String>) {
        self.entries.push(QueueEntry::Tagged(text.into()));
    }

    /// Transaction id used to correlate log lines
    pub fn transaction_id(&self) -> Uuid {
        self.transaction_id
    }

    /// Transaction flags
    pub fn flags(&self) -> TransactionFlags {
        self.flags
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    /// Structured records in insertion order (tagged entries skipped)
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.entries.iter().filter_map(QueueEntry::as_record)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was queued
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
