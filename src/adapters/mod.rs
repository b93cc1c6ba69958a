//! External system integrations for PharmaGate.
//!
//! - [`gateway`] - downstream gateway connections (TCP, dry-run, in-memory)
//! - [`hl7`] - contract for the external HL7 translator
//!
//! Adapters isolate external dependencies behind traits so the core can be
//! exercised against recording implementations:
//!
//! ```rust
//! use pharmagate::adapters::gateway::{Connector, GatewayConnection, MemoryConnector};
//!
//! let gateway = MemoryConnector::new();
//! let mut conn = gateway.connect().unwrap();
//! assert!(conn.write(b"<Record></Record>").unwrap());
//! assert_eq!(gateway.writes().len(), 1);
//! ```

pub mod gateway;
pub mod hl7;
