//! Dry-run connector: logs every write and acknowledges it

use super::traits::{Connector, GatewayConnection};
use crate::domain::GatewayError;
use crate::logging::payload;
use std::io;

/// Connector that never touches the network
#[derive(Debug, Clone, Default)]
pub struct DryRunConnector;

impl Connector for DryRunConnector {
    fn connect(&self) -> Result<Box<dyn GatewayConnection>, GatewayError> {
        tracing::info!("Dry run: gateway connection simulated");
        Ok(Box::new(DryRunConnection { writes: 0 }))
    }

    fn address(&self) -> String {
        "dry-run".to_string()
    }
}

struct DryRunConnection {
    writes: usize,
}

impl GatewayConnection for DryRunConnection {
    fn write(&mut self, data: &[u8]) -> io::Result<bool> {
        self.writes += 1;
        tracing::info!(
            write = self.writes,
            bytes = data.len(),
            sha256 = %payload::digest(data),
            "Dry run: would write to gateway"
        );
        Ok(true)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        tracing::debug!(writes = self.writes, "Dry run: connection closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_acknowledges_everything() {
        let mut conn = DryRunConnector.connect().unwrap();
        assert!(conn.write(b"<Record></Record>").unwrap());
        assert!(conn.write(b"").unwrap());
        conn.flush().unwrap();
        conn.close().unwrap();
    }
}
