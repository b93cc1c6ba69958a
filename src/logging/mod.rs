//! Logging and observability
//!
//! Structured logging with:
//! - Console output plus rolling JSON files (`daily` or `hourly`)
//! - Configurable log levels, overridable through `RUST_LOG`
//! - Payload fingerprints ([`payload`]) in place of raw patient data
//!
//! # Example
//!
//! ```no_run
//! use pharmagate::logging::init_logging;
//! use pharmagate::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Gateway started");
//! ```

pub mod payload;
pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a decode
///
/// # Example
///
/// ```no_run
/// use pharmagate::log_decode_start;
/// use pharmagate::domain::InputFormat;
///
/// log_decode_start!(InputFormat::Dispill, 2048);
/// ```
#[macro_export]
macro_rules! log_decode_start {
    ($format:expr, $length:expr) => {
        tracing::debug!(format = %$format, length = $length, "Starting decode");
    };
}

/// Log a committed transaction
///
/// # Example
///
/// ```no_run
/// use pharmagate::log_commit_complete;
/// use std::time::Duration;
///
/// log_commit_complete!("5f0c3c9e", 6, Duration::from_millis(12));
/// ```
#[macro_export]
macro_rules! log_commit_complete {
    ($transaction_id:expr, $records:expr, $duration:expr) => {
        tracing::info!(
            transaction_id = %$transaction_id,
            records = $records,
            duration_ms = $duration.as_millis() as u64,
            "Transaction committed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use pharmagate::log_error_with_context;
/// use pharmagate::domain::PharmaGateError;
///
/// let error = PharmaGateError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a quarantined input file
///
/// # Example
///
/// ```no_run
/// use pharmagate::log_quarantine;
/// use std::path::Path;
///
/// log_quarantine!(Path::new("/srv/in/batch.txt"), "Unidentified input format");
/// ```
#[macro_export]
macro_rules! log_quarantine {
    ($path:expr, $reason:expr) => {
        tracing::warn!(
            path = %$path.display(),
            reason = %$reason,
            "Input quarantined"
        );
    };
}
