//! Ingestion front-ends
//!
//! - [`watcher`] - polls a directory and quarantines files that fail
//! - [`listener`] - accepts socket connections and replies per message
//!
//! Both feed the shared [`crate::core::dispatch::Dispatcher`]; neither holds
//! state that another ingestion unit can see.

pub mod listener;
pub mod watcher;

pub use listener::{ListenerHandle, MessageHandler, SocketListener};
pub use watcher::{DirectoryWatcher, WatchSummary, WatcherHandle, QUARANTINE_SUFFIX};
