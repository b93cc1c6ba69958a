//! Parse command implementation
//!
//! One-shot ingestion of a single file: classify (or use `--format`),
//! decode, commit to the gateway and print the result.

use super::exit_code_for;
use crate::config::load_config;
use crate::core::dispatch::Dispatcher;
use crate::domain::InputFormat;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the parse command
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Input file to ingest
    pub file: PathBuf,

    /// Force a decoder instead of detecting the format (`auto` detects)
    #[arg(short, long, default_value = "auto")]
    pub format: String,

    /// Log the writes instead of sending them to the gateway
    #[arg(long)]
    pub dry_run: bool,
}

impl ParseArgs {
    /// Execute the parse command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(
            config_path = %config_path,
            file = %self.file.display(),
            format = %self.format,
            "Starting parse command"
        );

        let hint = match InputFormat::parse_hint(&self.format) {
            Ok(hint) => hint,
            Err(e) => {
                println!("❌ {e}");
                return Ok(2);
            }
        };

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let raw = std::fs::read(&self.file)?;

        let dispatcher = Dispatcher::from_config(&config, self.dry_run);
        if self.dry_run || config.application.dry_run {
            println!("🔍 Dry run: writes for {} are logged only", dispatcher.gateway_address());
        }
        println!("📥 Parsing {} ({} bytes)", self.file.display(), raw.len());
        println!();

        // The gateway protocol is synchronous
        let outcome = tokio::task::spawn_blocking(move || dispatcher.classify_and_parse(&raw, hint))
            .await?;

        match outcome {
            Ok(result) => {
                println!("{result}");
                println!();
                if result.is_complete() {
                    println!("✅ Input committed");
                    Ok(0)
                } else {
                    println!("⚠️  Input committed with skipped records");
                    Ok(1)
                }
            }
            Err(e) => {
                println!("❌ Parse failed");
                println!("   Error: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }
}
