//! Domain models and types for PharmaGate.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **The canonical record** ([`Record`], [`TableType`], [`Action`]) all decoders converge on
//! - **Input dialects** ([`InputFormat`])
//! - **Error types** ([`PharmaGateError`], [`GatewayError`])
//! - **Result type alias** ([`Result`])
//!
//! # Example
//!
//! ```rust
//! use pharmagate::domain::{Action, Record, TableType};
//!
//! let record = Record::new(TableType::Store, Action::Add)
//!     .with("RxSys_StoreID", "169252")
//!     .with("StoreName", "Main Street Pharmacy");
//!
//! assert!(record.to_tagged().starts_with("<Record><Table>Store</Table>"));
//! ```

pub mod errors;
pub mod format;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{GatewayError, PharmaGateError};
pub use format::InputFormat;
pub use record::{Action, Record, TableType};
pub use result::Result;
