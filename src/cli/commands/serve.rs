//! Serve command implementation
//!
//! Runs the enabled front-ends (directory watcher, socket listener) against
//! one shared dispatcher until a shutdown signal arrives.

use crate::config::{load_config, PharmaGateConfig};
use crate::core::dispatch::{respond, Dispatcher};
use crate::core::ingest::{DirectoryWatcher, MessageHandler, SocketListener};
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Log the writes instead of sending them to the gateway
    #[arg(long)]
    pub dry_run: bool,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(
        &self,
        config_path: &str,
        mut shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Starting serve command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        if !config.watcher.enabled && !config.listener.enabled {
            println!("❌ Nothing to serve: enable [watcher] and/or [listener]");
            return Ok(2);
        }

        let dispatcher = Arc::new(Dispatcher::from_config(&config, self.dry_run));
        println!("🚀 PharmaGate forwarding to {}", dispatcher.gateway_address());

        // Construct both front-ends before starting either so a bad
        // configuration never leaves one running
        let watcher = if config.watcher.enabled {
            match DirectoryWatcher::new(&config.watcher, Arc::clone(&dispatcher)) {
                Ok(w) => Some(w),
                Err(e) => {
                    println!("❌ Cannot start directory watcher");
                    println!("   Error: {e}");
                    return Ok(2);
                }
            }
        } else {
            None
        };

        let listener = if config.listener.enabled {
            match SocketListener::new(&config.listener, Some(handler(&config, &dispatcher))) {
                Ok(l) => Some(l),
                Err(e) => {
                    println!("❌ Cannot start socket listener");
                    println!("   Error: {e}");
                    return Ok(2);
                }
            }
        } else {
            None
        };

        let listener = match listener.map(SocketListener::start).transpose() {
            Ok(handle) => handle,
            Err(e) => {
                println!("❌ Cannot bind socket listener");
                println!("   Error: {e}");
                return Ok(4);
            }
        };
        if let Some(ref handle) = listener {
            println!("👂 Listening on {}", handle.local_addr());
        }

        let watcher = match watcher {
            Some(w) => {
                println!("👀 Watching {} ({:?})", w.directory().display(), config.watcher.run_mode);
                match w.start(config.watcher.run_mode, shutdown_signal.clone()) {
                    Ok(handle) => Some(handle),
                    Err(e) => {
                        if let Some(handle) = listener {
                            handle.stop();
                        }
                        return Err(e.into());
                    }
                }
            }
            None => None,
        };

        println!("   Press Ctrl+C to stop");
        while !*shutdown_signal.borrow() {
            if shutdown_signal.changed().await.is_err() {
                break;
            }
        }
        tracing::info!("Shutdown requested, stopping front-ends");

        if let Some(handle) = listener {
            tokio::task::spawn_blocking(move || handle.shutdown()).await??;
            println!("✅ Listener stopped");
        }
        if let Some(handle) = watcher {
            let summary = handle.join().await?;
            println!("✅ Watcher stopped");
            println!();
            println!("Watcher Summary:");
            println!("  Scans: {}", summary.scans);
            println!("  Processed: {}", summary.processed);
            println!("  Quarantined: {}", summary.quarantined);
            println!("  Deferred: {}", summary.deferred);
        }

        Ok(0)
    }
}

/// Socket handler: ingest each message and answer ACK or NAK
fn handler(config: &PharmaGateConfig, dispatcher: &Arc<Dispatcher>) -> MessageHandler {
    let dispatcher = Arc::clone(dispatcher);
    let hint = config.listener.format_hint();
    Arc::new(move |raw: &[u8]| respond(&dispatcher.classify_and_parse(raw, hint)))
}
