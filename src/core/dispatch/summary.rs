//! Commit results and reporting

use crate::core::commit::CommitReceipt;
use crate::core::decoders::SkippedRecord;
use crate::domain::InputFormat;
use std::fmt;
use std::time::Duration;

/// Outcome of dispatching one input unit
#[derive(Debug, Clone)]
pub struct CommitResult {
    /// Format the input was decoded as
    pub format: InputFormat,

    /// One receipt per committed transaction, in commit order
    pub transactions: Vec<CommitReceipt>,

    /// Entries written across all transactions
    pub records_written: usize,

    /// Records the decoder dropped
    pub skipped: Vec<SkippedRecord>,

    /// Wall time from decode start to last acknowledgment
    pub duration: Duration,
}

impl CommitResult {
    /// Create an empty result for `format`
    pub fn new(format: InputFormat) -> Self {
        Self {
            format,
            transactions: Vec::new(),
            records_written: 0,
            skipped: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// Add a committed transaction
    pub fn push(&mut self, receipt: CommitReceipt) {
        self.records_written += receipt.records;
        self.transactions.push(receipt);
    }

    /// Whether every record of the input reached the gateway
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Log the result
    pub fn log(&self) {
        tracing::info!(
            format = %self.format,
            transactions = self.transactions.len(),
            records = self.records_written,
            skipped = self.skipped.len(),
            duration_ms = self.duration.as_millis() as u64,
            "Input committed"
        );
        for skipped in &self.skipped {
            tracing::warn!(format = %self.format, %skipped, "Record not committed");
        }
    }
}

impl fmt::Display for CommitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Format:        {}", self.format)?;
        writeln!(f, "Transactions:  {}", self.transactions.len())?;
        writeln!(f, "Records:       {}", self.records_written)?;
        writeln!(f, "Skipped:       {}", self.skipped.len())?;
        for skipped in &self.skipped {
            writeln!(f, "  - {skipped}")?;
        }
        write!(f, "Duration:      {:.2}s", self.duration.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn receipt(records: usize) -> CommitReceipt {
        CommitReceipt {
            transaction_id: Uuid::new_v4(),
            records,
            writes: records + 1,
        }
    }

    #[test]
    fn test_push_accumulates() {
        let mut result = CommitResult::new(InputFormat::Parada);
        result.push(receipt(5));
        result.push(receipt(6));
        assert_eq!(result.transactions.len(), 2);
        assert_eq!(result.records_written, 11);
        assert!(result.is_complete());
    }

    #[test]
    fn test_display_lists_skipped() {
        let mut result = CommitResult::new(InputFormat::Dispill);
        result.skipped.push(SkippedRecord {
            position: 3,
            reason: "medication row before any patient row".to_string(),
        });
        let text = result.to_string();
        assert!(text.contains("Format:        dispill"));
        assert!(text.contains("record 3: medication row before any patient row"));
        assert!(!result.is_complete());
    }
}
