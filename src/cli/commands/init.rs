//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "pharmagate.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing PharmaGate configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Set [gateway] host and port for your pharmacy system");
                println!("  2. Enable [watcher] and/or [listener]");
                println!("  3. For a TLS listener, set PHARMAGATE_TLS_PASSWORD in .env");
                println!("  4. Validate configuration: pharmagate validate-config");
                println!("  5. Try a file: pharmagate parse --dry-run <FILE>");
                println!("  6. Run: pharmagate serve");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# PharmaGate Configuration File
# Pharmacy data interchange gateway

[application]
log_level = "info"
dry_run = false

[gateway]
host = "localhost"
port = 24042
write_mode = "wait_for_ack"
commit_mode = "batch"
send_eof = true
timeout_seconds = 30

[watcher]
enabled = true
directory = "/srv/pharmagate/inbound"
poll_interval_ms = 1000
run_mode = "blocking"
format = "auto"

[listener]
enabled = false
bind_address = "0.0.0.0"
port = 24045
format = "auto"

[logging]
local_enabled = true
local_path = "/var/log/pharmagate"
local_rotation = "daily"
file_prefix = "pharmagate"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# PharmaGate Configuration File
# Pharmacy data interchange gateway
#
# PharmaGate accepts prescription, patient and inventory data in vendor
# formats (HL7, XML, JSON, tagged records, Parada, delimited, Dispill,
# MTS and OASIS), translates it into canonical records and commits them
# to the pharmacy gateway as transactions.
#
# Any value may reference an environment variable as ${NAME}, and any
# key may be overridden with PHARMAGATE_<SECTION>_<KEY>.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# Dry run mode (log writes instead of sending them to the gateway)
dry_run = false

# ============================================================================
# Gateway Connection
# ============================================================================
[gateway]
# Gateway host and TCP port
host = "localhost"
port = 24042

# Acknowledgment handling: "wait_for_ack" or "fire_and_forget"
# - wait_for_ack: every write must be answered with ACK (0x06)
# - fire_and_forget: a write is acknowledged once it is sent
write_mode = "wait_for_ack"

# Transaction framing: "batch" or "per_record"
# - batch: all records of a transaction in one write
# - per_record: one write per record on the same connection
commit_mode = "batch"

# Send the <EOF/> marker after each transaction
send_eof = true

# Log every serialized record before it is written
debug_logging = false

# Connect/read/write timeout in seconds (1-600)
timeout_seconds = 30

# ============================================================================
# Directory Watcher
# ============================================================================
[watcher]
enabled = true

# Every file dropped here is ingested and deleted. Files that cannot be
# decoded are renamed with a .FAILED suffix; files whose commit failed
# stay in place and are retried on the next scan.
directory = "/srv/pharmagate/inbound"

# Delay between scans in milliseconds (>= 100)
poll_interval_ms = 1000

# "blocking" (dedicated thread) or "async" (tokio task)
run_mode = "blocking"

# "auto" detects the format. Dispill, MTS and OASIS files cannot be
# detected and need an explicit format here.
format = "auto"

# ============================================================================
# Socket Listener
# ============================================================================
[listener]
enabled = false
bind_address = "0.0.0.0"
port = 24045
format = "auto"

# A message ends when the sender closes or stays idle this long
read_timeout_ms = 500

# Larger messages are answered with NAK and the connection is closed
max_message_bytes = 16777216

# TLS with a PKCS#12 identity
tls_enabled = false
# tls_identity_path = "/etc/pharmagate/listener.p12"
# tls_identity_password = "${PHARMAGATE_TLS_PASSWORD}"

# Send ACK/NAK to another endpoint instead of the sender
# response_host = "pharmacy-host.local"
# response_port = 24046

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Enable local file logging (JSON lines)
local_enabled = true

# Local log directory
local_path = "/var/log/pharmagate"

# Log rotation (daily or hourly)
local_rotation = "daily"

# Log file name prefix
file_prefix = "pharmagate"
"#
        .to_string()
    }
}
