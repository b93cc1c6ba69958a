//! Gateway connection contract
//!
//! The gateway is an external process; these traits are the seam between
//! the committer and whatever carries bytes to it (TCP, a dry-run logger, or
//! an in-memory recorder in tests).

use crate::domain::GatewayError;
use std::io;

/// Acknowledgment byte sent by the gateway for an accepted write
pub const ACK: u8 = 0x06;

/// Negative acknowledgment byte
pub const NAK: u8 = 0x15;

/// Marker written after the last record of a transaction when `send_eof` is set
pub const EOF_MARKER: &str = "<EOF/>";

/// One open connection to the gateway
pub trait GatewayConnection: Send {
    /// Writes one payload.
    ///
    /// Returns `Ok(true)` when the gateway acknowledged the write and
    /// `Ok(false)` when it answered with a rejection. Transport problems
    /// (including the peer closing before answering) are `Err`.
    fn write(&mut self, payload: &[u8]) -> io::Result<bool>;

    /// Flushes buffered output
    fn flush(&mut self) -> io::Result<()>;

    /// Closes the connection
    fn close(&mut self) -> io::Result<()>;
}

/// Opens gateway connections
pub trait Connector: Send + Sync {
    /// Dials the gateway
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConnectionFailed`] when the gateway cannot be reached.
    fn connect(&self) -> Result<Box<dyn GatewayConnection>, GatewayError>;

    /// Human-readable target, for logs
    fn address(&self) -> String;
}
