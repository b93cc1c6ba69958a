//! In-memory recording connector
//!
//! Captures every write so callers can assert on exactly what reached the
//! gateway. Can be scripted to reject, or fail in transport, on the N-th
//! write (counted across all connections, zero-based), or to refuse
//! connections entirely.

use super::traits::{Connector, GatewayConnection};
use crate::domain::GatewayError;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryState {
    writes: Vec<Vec<u8>>,
    attempts: usize,
    connections: usize,
    closed: usize,
    reject_at: Option<usize>,
    fail_at: Option<usize>,
    refuse: bool,
}

/// Recording connector; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryConnector {
    /// Connector that acknowledges everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers the `index`-th write with a rejection
    pub fn rejecting_at(self, index: usize) -> Self {
        self.lock().reject_at = Some(index);
        self
    }

    /// Fails the `index`-th write with a transport error
    pub fn failing_at(self, index: usize) -> Self {
        self.lock().fail_at = Some(index);
        self
    }

    /// Refuses every connection attempt
    pub fn refusing(self) -> Self {
        self.lock().refuse = true;
        self
    }

    /// Accepted payloads, in order, as text
    pub fn writes(&self) -> Vec<String> {
        self.lock()
            .writes
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }

    /// Number of connections opened
    pub fn connections(&self) -> usize {
        self.lock().connections
    }

    /// Number of connections closed
    pub fn closed(&self) -> usize {
        self.lock().closed
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Connector for MemoryConnector {
    fn connect(&self) -> Result<Box<dyn GatewayConnection>, GatewayError> {
        let mut state = self.lock();
        if state.refuse {
            return Err(GatewayError::ConnectionFailed {
                address: self.address(),
                reason: "connection refused".to_string(),
            });
        }
        state.connections += 1;
        Ok(Box::new(MemoryConnection {
            state: Arc::clone(&self.state),
        }))
    }

    fn address(&self) -> String {
        "memory".to_string()
    }
}

struct MemoryConnection {
    state: Arc<Mutex<MemoryState>>,
}

impl GatewayConnection for MemoryConnection {
    fn write(&mut self, payload: &[u8]) -> io::Result<bool> {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        let index = state.attempts;
        state.attempts += 1;

        if state.fail_at == Some(index) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "connection reset"));
        }
        if state.reject_at == Some(index) {
            return Ok(false);
        }
        state.writes.push(payload.to_vec());
        Ok(true)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.state.lock().unwrap_or_else(|p| p.into_inner()).closed += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_writes() {
        let connector = MemoryConnector::new();
        let mut conn = connector.connect().unwrap();
        assert!(conn.write(b"one").unwrap());
        assert!(conn.write(b"two").unwrap());
        conn.close().unwrap();

        assert_eq!(connector.writes(), vec!["one", "two"]);
        assert_eq!(connector.connections(), 1);
        assert_eq!(connector.closed(), 1);
    }

    #[test]
    fn test_scripted_failures() {
        let connector = MemoryConnector::new().rejecting_at(1).failing_at(2);
        let mut conn = connector.connect().unwrap();
        assert!(conn.write(b"a").unwrap());
        assert!(!conn.write(b"b").unwrap());
        assert!(conn.write(b"c").is_err());
        assert_eq!(connector.writes(), vec!["a"]);
    }

    #[test]
    fn test_refusing() {
        let connector = MemoryConnector::new().refusing();
        assert!(connector.connect().is_err());
        assert_eq!(connector.connections(), 0);
    }
}
