//! Downstream gateway connections
//!
//! - [`traits`] - the connection contract ([`Connector`], [`GatewayConnection`])
//! - [`tcp`] - TCP connector with wait-for-ack or fire-and-forget writes
//! - [`dry_run`] - logs writes instead of sending them
//! - [`memory`] - recording connector for tests and embedding

pub mod dry_run;
pub mod memory;
pub mod tcp;
pub mod traits;

pub use dry_run::DryRunConnector;
pub use memory::MemoryConnector;
pub use tcp::TcpConnector;
pub use traits::{Connector, GatewayConnection, ACK, EOF_MARKER, NAK};

use crate::config::PharmaGateConfig;
use std::sync::Arc;

/// Creates the connector the configuration asks for
///
/// `dry_run` (from `[application]` or the command line) replaces the TCP
/// connector with [`DryRunConnector`].
pub fn create_connector(config: &PharmaGateConfig, dry_run: bool) -> Arc<dyn Connector> {
    if dry_run || config.application.dry_run {
        tracing::info!("Creating dry-run gateway connector");
        Arc::new(DryRunConnector)
    } else {
        tracing::info!(address = %config.gateway.address(), "Creating TCP gateway connector");
        Arc::new(TcpConnector::new(&config.gateway))
    }
}
