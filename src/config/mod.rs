//! Configuration management for PharmaGate.
//!
//! PharmaGate uses a TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `PHARMAGATE_<SECTION>_<KEY>` overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pharmagate::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("pharmagate.toml")?;
//!
//! println!("Gateway: {}", config.gateway.address());
//! if config.watcher.enabled {
//!     println!("Watching {}", config.watcher.directory);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [gateway]
//! host = "gateway.pharmacy.local"
//! port = 24042
//! write_mode = "wait_for_ack"
//! commit_mode = "batch"
//! send_eof = true
//!
//! [watcher]
//! enabled = true
//! directory = "/srv/pharmagate/inbound"
//!
//! [listener]
//! enabled = true
//! port = 24045
//! tls_enabled = true
//! tls_identity_path = "/etc/pharmagate/listener.p12"
//! tls_identity_password = "${PHARMAGATE_TLS_PASSWORD}"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, CommitMode, GatewayConfig, ListenerConfig, LoggingConfig,
    PharmaGateConfig, RunMode, WatcherConfig, WriteMode,
};
pub use secret::{secret_string, SecretString, SecretValue};
