//! Core business logic for PharmaGate.
//!
//! # Modules
//!
//! - [`layout`] - binary layout reader and the MTS / OASIS record layouts
//! - [`mapping`] - per-table field maps for both delimited generations
//! - [`transform`] - date, NDC and dose schedule normalization
//! - [`decoders`] - one decoder per input dialect
//! - [`dispatch`] - format classification and decoder dispatch
//! - [`commit`] - write queues and the shared gateway writer
//! - [`ingest`] - directory watcher and socket listener
//!
//! # Flow
//!
//! 1. **Ingest**: a file or socket message arrives as raw bytes
//! 2. **Classify**: an explicit hint or the ordered heuristics pick a format
//! 3. **Decode**: the format's decoder produces one or more write queues
//! 4. **Commit**: each queue is written to the gateway as one transaction
//! 5. **Report**: the front-end deletes, quarantines or answers ACK/NAK
//!
//! # Example
//!
//! ```rust
//! use pharmagate::adapters::gateway::MemoryConnector;
//! use pharmagate::core::commit::{GatewayWriter, TransactionFlags};
//! use pharmagate::core::dispatch::Dispatcher;
//! use pharmagate::domain::InputFormat;
//! use std::sync::Arc;
//!
//! let gateway = MemoryConnector::new();
//! let writer = Arc::new(GatewayWriter::new(Arc::new(gateway.clone())));
//! let dispatcher = Dispatcher::new(writer, TransactionFlags::default());
//!
//! let dispill = "F1001,DOE,JANE\n\
//!                M42,ASPIRIN 81 MG TABLET,TAB,DAILY,,,,,,30,0,01;00;00;00,123456789\n";
//! let result = dispatcher
//!     .classify_and_parse(dispill.as_bytes(), Some(InputFormat::Dispill))
//!     .unwrap();
//! assert_eq!(result.transactions.len(), 1);
//! ```

pub mod commit;
pub mod decoders;
pub mod dispatch;
pub mod ingest;
pub mod layout;
pub mod mapping;
pub mod transform;
