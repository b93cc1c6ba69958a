//! Write queues and the transaction committer

pub mod committer;
pub mod queue;

pub use committer::{CommitReceipt, GatewayWriter};
pub use queue::{QueueEntry, TransactionFlags, WriteQueue};
