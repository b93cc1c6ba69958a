//! Transaction committer
//!
//! [`GatewayWriter`] is the single outbound path to the gateway. Every
//! ingestion unit (watcher, listener connections, external pollers) shares
//! one writer; its lock is held for exactly one write-then-acknowledge cycle
//! and is released when the guard drops, including on error paths.

use super::queue::{QueueEntry, WriteQueue};
use crate::adapters::gateway::{Connector, GatewayConnection, EOF_MARKER};
use crate::config::CommitMode;
use crate::domain::{GatewayError, Record, Result};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use uuid::Uuid;

/// Outcome of one committed queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Transaction id of the queue
    pub transaction_id: Uuid,
    /// Entries committed
    pub records: usize,
    /// Physical writes performed (including the EOF marker)
    pub writes: usize,
}

/// Serialized access to the downstream gateway
pub struct GatewayWriter {
    connector: Arc<dyn Connector>,
    lock: Mutex<()>,
}

impl GatewayWriter {
    /// Wraps a connector
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            lock: Mutex::new(()),
        }
    }

    /// Gateway address, for logs
    pub fn address(&self) -> String {
        self.connector.address()
    }

    /// Commits a queue as one transaction.
    ///
    /// Entries are written in insertion order, either concatenated into one
    /// write ([`CommitMode::Batch`]) or one write each
    /// ([`CommitMode::PerRecord`]), followed by [`EOF_MARKER`] when the queue
    /// asks for it. The first rejected or failed write aborts the rest.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::PharmaGateError::GatewayWriteFailure`] on
    /// connection failure, rejection, or transport error.
    pub fn commit(&self, queue: &WriteQueue) -> Result<CommitReceipt> {
        let transaction_id = queue.transaction_id();
        if queue.is_empty() {
            tracing::debug!(%transaction_id, "Empty transaction, nothing to commit");
            return Ok(CommitReceipt {
                transaction_id,
                records: 0,
                writes: 0,
            });
        }

        let flags = queue.flags();
        let payloads = frame(queue.entries(), flags.commit_mode, flags.send_eof);
        if flags.debug_logging {
            for entry in queue.entries() {
                tracing::debug!(%transaction_id, record = %entry.to_wire(), "Queued record");
            }
        }

        let started = Instant::now();
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut conn = self.connector.connect()?;
        let outcome = write_all(conn.as_mut(), &payloads, &transaction_id.to_string());
        close_quietly(conn.as_mut());
        outcome?;

        crate::log_commit_complete!(transaction_id, queue.len(), started.elapsed());
        Ok(CommitReceipt {
            transaction_id,
            records: queue.len(),
            writes: payloads.len(),
        })
    }

    /// Writes one record over its own short-lived connection.
    ///
    /// This is the per-row path used by table pollers: connect, write, wait
    /// for the acknowledgment, close, all under the shared lock.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::PharmaGateError::GatewayWriteFailure`] on
    /// connection failure, rejection, or transport error.
    pub fn write_record(&self, record: &Record) -> Result<()> {
        let transaction_id = Uuid::new_v4().to_string();
        let payload = record.to_tagged();

        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut conn = self.connector.connect()?;
        let outcome = write_all(conn.as_mut(), &[payload], &transaction_id);
        close_quietly(conn.as_mut());
        outcome?;

        tracing::debug!(
            transaction_id = %transaction_id,
            table = %record.table(),
            "Record written"
        );
        Ok(())
    }
}

fn frame(entries: &[QueueEntry], mode: CommitMode, send_eof: bool) -> Vec<String> {
    let mut payloads: Vec<String> = match mode {
        CommitMode::Batch => vec![entries.iter().map(|e| e.to_wire()).collect()],
        CommitMode::PerRecord => entries.iter().map(|e| e.to_wire().into_owned()).collect(),
    };
    if send_eof {
        payloads.push(EOF_MARKER.to_string());
    }
    payloads
}

fn write_all(
    conn: &mut dyn GatewayConnection,
    payloads: &[String],
    transaction_id: &str,
) -> std::result::Result<(), GatewayError> {
    for (index, payload) in payloads.iter().enumerate() {
        match conn.write(payload.as_bytes()) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(transaction_id, index, "Gateway rejected write");
                return Err(GatewayError::Rejected {
                    transaction_id: transaction_id.to_string(),
                    index,
                });
            }
            Err(e) => {
                let error = if matches!(
                    e.kind(),
                    std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
                ) {
                    GatewayError::Timeout(format!("write {index}: {e}"))
                } else {
                    GatewayError::WriteFailed {
                        index,
                        reason: e.to_string(),
                    }
                };
                tracing::warn!(transaction_id, index, error = %error, "Gateway write failed");
                return Err(error);
            }
        }
    }
    conn.flush().map_err(|e| GatewayError::WriteFailed {
        index: payloads.len(),
        reason: e.to_string(),
    })
}

fn close_quietly(conn: &mut dyn GatewayConnection) {
    if let Err(e) = conn.close() {
        tracing::debug!(error = %e, "Error closing gateway connection");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gateway::MemoryConnector;
    use crate::core::commit::TransactionFlags;
    use crate::domain::{Action, PharmaGateError, TableType};
    use std::thread;

    fn queue(mode: CommitMode, send_eof: bool, n: usize) -> WriteQueue {
        let mut queue = WriteQueue::new(TransactionFlags {
            send_eof,
            debug_logging: true,
            commit_mode: mode,
        });
        for i in 0..n {
            queue.push(Record::new(TableType::Rx, Action::Add).with("RxSys_RxNum", i.to_string()));
        }
        queue
    }

    fn writer(connector: &MemoryConnector) -> GatewayWriter {
        GatewayWriter::new(Arc::new(connector.clone()))
    }

    #[test]
    fn test_batch_is_one_write_plus_eof() {
        let gateway = MemoryConnector::new();
        let receipt = writer(&gateway)
            .commit(&queue(CommitMode::Batch, true, 3))
            .unwrap();

        let writes = gateway.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].matches("<Record>").count(), 3);
        assert!(writes[0].find("<RxSys_RxNum>0<").unwrap() < writes[0].find("<RxSys_RxNum>2<").unwrap());
        assert_eq!(writes[1], EOF_MARKER);
        assert_eq!(receipt.records, 3);
        assert_eq!(receipt.writes, 2);
        assert_eq!(gateway.closed(), 1);
    }

    #[test]
    fn test_per_record_without_eof() {
        let gateway = MemoryConnector::new();
        writer(&gateway)
            .commit(&queue(CommitMode::PerRecord, false, 3))
            .unwrap();

        let writes = gateway.writes();
        assert_eq!(writes.len(), 3);
        assert!(writes[2].contains("<RxSys_RxNum>2</RxSys_RxNum>"));
        assert_eq!(gateway.connections(), 1);
    }

    #[test]
    fn test_rejection_aborts_remaining_writes() {
        let gateway = MemoryConnector::new().rejecting_at(1);
        let err = writer(&gateway)
            .commit(&queue(CommitMode::PerRecord, true, 4))
            .unwrap_err();

        assert!(matches!(
            err,
            PharmaGateError::GatewayWriteFailure(GatewayError::Rejected { index: 1, .. })
        ));
        assert_eq!(gateway.writes().len(), 1);
        assert_eq!(gateway.closed(), 1);
    }

    #[test]
    fn test_transport_failure_surfaces() {
        let gateway = MemoryConnector::new().failing_at(0);
        let err = writer(&gateway)
            .commit(&queue(CommitMode::Batch, true, 1))
            .unwrap_err();
        assert!(matches!(
            err,
            PharmaGateError::GatewayWriteFailure(GatewayError::WriteFailed { index: 0, .. })
        ));
    }

    #[test]
    fn test_connection_failure_surfaces() {
        let gateway = MemoryConnector::new().refusing();
        let err = writer(&gateway)
            .commit(&queue(CommitMode::Batch, true, 1))
            .unwrap_err();
        assert!(matches!(
            err,
            PharmaGateError::GatewayWriteFailure(GatewayError::ConnectionFailed { .. })
        ));
    }

    #[test]
    fn test_empty_queue_does_not_connect() {
        let gateway = MemoryConnector::new();
        let receipt = writer(&gateway)
            .commit(&queue(CommitMode::Batch, true, 0))
            .unwrap();
        assert_eq!(receipt.writes, 0);
        assert_eq!(gateway.connections(), 0);
    }

    #[test]
    fn test_lock_released_after_failure() {
        let gateway = MemoryConnector::new().failing_at(0);
        let writer = writer(&gateway);
        let record = Record::new(TableType::Drug, Action::Add);

        assert!(writer.write_record(&record).is_err());
        writer.write_record(&record).unwrap();
        assert_eq!(gateway.writes().len(), 1);
        assert_eq!(gateway.connections(), 2);
    }

    #[test]
    fn test_concurrent_write_record_is_serialized() {
        let gateway = MemoryConnector::new();
        let writer = Arc::new(writer(&gateway));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let writer = Arc::clone(&writer);
                thread::spawn(move || {
                    let record = Record::new(TableType::Patient, Action::Add)
                        .with("RxSys_PatID", i.to_string());
                    writer.write_record(&record)
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        assert_eq!(gateway.writes().len(), 8);
        assert_eq!(gateway.connections(), 8);
        assert_eq!(gateway.closed(), 8);
    }
}
