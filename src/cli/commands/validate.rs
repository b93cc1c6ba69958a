//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the PharmaGate configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as part of loading
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(2); // Configuration error exit code
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Gateway: {}", config.gateway.address());
        println!("  Write Mode: {:?}", config.gateway.write_mode);
        println!("  Commit Mode: {:?}", config.gateway.commit_mode);
        println!("  Send EOF: {}", config.gateway.send_eof);
        println!("  Timeout: {}s", config.gateway.timeout_seconds);

        if config.watcher.enabled {
            println!(
                "  Watcher: {} every {}ms ({:?}, format {})",
                config.watcher.directory,
                config.watcher.poll_interval_ms,
                config.watcher.run_mode,
                config.watcher.format
            );
        } else {
            println!("  Watcher: disabled");
        }

        if config.listener.enabled {
            println!(
                "  Listener: {}:{} (format {}, TLS {})",
                config.listener.bind_address,
                config.listener.port,
                config.listener.format,
                if config.listener.tls_enabled { "on" } else { "off" }
            );
            if let (Some(host), Some(port)) =
                (&config.listener.response_host, config.listener.response_port)
            {
                println!("  Responses To: {host}:{port}");
            }
        } else {
            println!("  Listener: disabled");
        }

        if config.logging.local_enabled {
            println!(
                "  Log Files: {}/{} ({})",
                config.logging.local_path, config.logging.file_prefix, config.logging.local_rotation
            );
        }
        println!();
        Ok(0)
    }
}
