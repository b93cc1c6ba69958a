//! Configuration schema types
//!
//! This module defines the configuration structure for PharmaGate.

use crate::config::SecretString;
use crate::domain::InputFormat;
use serde::{Deserialize, Serialize};

/// How the gateway connection treats each write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Block until the gateway acknowledges (or rejects) the write
    #[default]
    WaitForAck,
    /// Treat every successfully-sent write as acknowledged
    FireAndForget,
}

/// How a write queue is framed on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CommitMode {
    /// All records concatenated into one write
    #[default]
    Batch,
    /// One write per record, same connection
    PerRecord,
}

/// Directory watcher execution model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Blocking poll loop on a dedicated OS thread
    #[default]
    Blocking,
    /// Background tokio task the caller awaits
    Async,
}

/// Main PharmaGate configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PharmaGateConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Downstream gateway connection
    pub gateway: GatewayConfig,

    /// Directory watcher front-end
    #[serde(default)]
    pub watcher: WatcherConfig,

    /// Socket listener front-end
    #[serde(default)]
    pub listener: ListenerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PharmaGateConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.gateway.validate()?;
        self.watcher.validate()?;
        self.listener.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (log writes instead of sending them to the gateway)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Downstream gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway host name or address
    pub host: String,

    /// Gateway TCP port
    pub port: u16,

    /// Acknowledgment behavior
    #[serde(default)]
    pub write_mode: WriteMode,

    /// Wire framing of a transaction
    #[serde(default)]
    pub commit_mode: CommitMode,

    /// Emit the end-of-stream marker after each transaction
    #[serde(default = "default_true")]
    pub send_eof: bool,

    /// Log every serialized record before it is written
    #[serde(default)]
    pub debug_logging: bool,

    /// Connect/read/write timeout
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl GatewayConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("gateway.host cannot be empty".to_string());
        }
        if self.port == 0 {
            return Err("gateway.port must be > 0".to_string());
        }
        if !(1..=600).contains(&self.timeout_seconds) {
            return Err(format!(
                "gateway.timeout_seconds must be between 1 and 600, got {}",
                self.timeout_seconds
            ));
        }
        Ok(())
    }

    /// `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Directory watcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Run the watcher under `serve`
    #[serde(default)]
    pub enabled: bool,

    /// Directory to poll
    #[serde(default)]
    pub directory: String,

    /// Delay between scans
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Blocking thread or async task
    #[serde(default)]
    pub run_mode: RunMode,

    /// `auto` or a format name forcing one decoder
    #[serde(default = "default_format")]
    pub format: String,
}

impl WatcherConfig {
    fn validate(&self) -> Result<(), String> {
        if self.poll_interval_ms < 100 {
            return Err(format!(
                "watcher.poll_interval_ms must be >= 100, got {}",
                self.poll_interval_ms
            ));
        }
        InputFormat::parse_hint(&self.format).map_err(|e| format!("watcher.format: {e}"))?;
        if self.enabled && self.directory.trim().is_empty() {
            return Err("watcher.directory is required when the watcher is enabled".to_string());
        }
        Ok(())
    }

    /// Format hint, `None` for heuristic detection
    pub fn format_hint(&self) -> Option<InputFormat> {
        InputFormat::parse_hint(&self.format).ok().flatten()
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: String::new(),
            poll_interval_ms: default_poll_interval_ms(),
            run_mode: RunMode::default(),
            format: default_format(),
        }
    }
}

/// Socket listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerConfig {
    /// Run the listener under `serve`
    #[serde(default)]
    pub enabled: bool,

    /// Interface to bind
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port to bind (0 picks an ephemeral port)
    #[serde(default)]
    pub port: u16,

    /// `auto` or a format name forcing one decoder
    #[serde(default = "default_format")]
    pub format: String,

    /// Idle time that ends one inbound message
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    /// Largest inbound message; a connection sending more is answered
    /// with NAK and closed
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,

    /// Accept TLS connections
    #[serde(default)]
    pub tls_enabled: bool,

    /// PKCS#12 server identity
    #[serde(default)]
    pub tls_identity_path: Option<String>,

    /// Password for the PKCS#12 identity
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub tls_identity_password: Option<SecretString>,

    /// Send responses to this host instead of the originating connection
    #[serde(default)]
    pub response_host: Option<String>,

    /// Port paired with `response_host`
    #[serde(default)]
    pub response_port: Option<u16>,
}

impl ListenerConfig {
    fn validate(&self) -> Result<(), String> {
        InputFormat::parse_hint(&self.format).map_err(|e| format!("listener.format: {e}"))?;
        if self.read_timeout_ms == 0 {
            return Err("listener.read_timeout_ms must be > 0".to_string());
        }
        if self.max_message_bytes == 0 {
            return Err("listener.max_message_bytes must be > 0".to_string());
        }
        if self.enabled && self.bind_address.trim().is_empty() {
            return Err("listener.bind_address cannot be empty".to_string());
        }
        if self.tls_enabled && self.tls_identity_path.is_none() {
            return Err("listener.tls_identity_path is required when tls_enabled".to_string());
        }
        if self.response_host.is_some() != self.response_port.is_some() {
            return Err(
                "listener.response_host and listener.response_port must be set together"
                    .to_string(),
            );
        }
        Ok(())
    }

    /// Format hint, `None` for heuristic detection
    pub fn format_hint(&self) -> Option<InputFormat> {
        InputFormat::parse_hint(&self.format).ok().flatten()
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: default_bind_address(),
            port: 0,
            format: default_format(),
            read_timeout_ms: default_read_timeout_ms(),
            max_message_bytes: default_max_message_bytes(),
            tls_enabled: false,
            tls_identity_path: None,
            tls_identity_password: None,
            response_host: None,
            response_port: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,

    /// Log file name prefix
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.file_prefix.trim().is_empty() {
            return Err("logging.file_prefix cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
            file_prefix: default_file_prefix(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_format() -> String {
    "auto".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_read_timeout_ms() -> u64 {
    500
}

fn default_max_message_bytes() -> usize {
    16 * 1024 * 1024
}

fn default_local_path() -> String {
    "/var/log/pharmagate".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

fn default_file_prefix() -> String {
    "pharmagate".to_string()
}
