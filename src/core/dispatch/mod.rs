//! Format dispatch
//!
//! - [`detect`] - ordered heuristics that classify raw input
//! - [`dispatcher`] - decoder lookup and transactional commit
//! - [`summary`] - per-input commit results
//!
//! # Example
//!
//! ```rust
//! use pharmagate::adapters::gateway::MemoryConnector;
//! use pharmagate::core::commit::{GatewayWriter, TransactionFlags};
//! use pharmagate::core::dispatch::Dispatcher;
//! use std::sync::Arc;
//!
//! let gateway = MemoryConnector::new();
//! let writer = Arc::new(GatewayWriter::new(Arc::new(gateway.clone())));
//! let dispatcher = Dispatcher::new(writer, TransactionFlags::default());
//!
//! let raw = b"<Record><Table>Store</Table><Action>Add</Action></Record>";
//! let result = dispatcher.classify_and_parse(raw, None).unwrap();
//! assert_eq!(result.records_written, 1);
//! ```

pub mod detect;
pub mod dispatcher;
pub mod summary;

pub use detect::{classify, Classification};
pub use dispatcher::{respond, Dispatcher};
pub use summary::CommitResult;
