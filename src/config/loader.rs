//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{CommitMode, PharmaGateConfig, RunMode, WriteMode};
use super::secret_string;
use crate::domain::errors::PharmaGateError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("static regex"));

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into PharmaGateConfig
/// 4. Applies environment variable overrides (PHARMAGATE_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`PharmaGateError::Configuration`] if the file cannot be read or
/// parsed, a referenced variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use pharmagate::config::load_config;
///
/// let config = load_config("pharmagate.toml").expect("Failed to load config");
/// println!("gateway at {}", config.gateway.address());
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<PharmaGateConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PharmaGateError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        PharmaGateError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration text (substitution, overrides and validation included)
pub fn parse_config(contents: &str) -> Result<PharmaGateConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: PharmaGateConfig = toml::from_str(&contents)
        .map_err(|e| PharmaGateError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        PharmaGateError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = ENV_PLACEHOLDER.replace_all(line, |cap: &regex::Captures<'_>| {
            let var_name = &cap[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                if !missing_vars.iter().any(|m| m == var_name) {
                    missing_vars.push(var_name.to_string());
                }
                String::new()
            })
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(PharmaGateError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env(name) {
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            PharmaGateError::Configuration(format!("Invalid value '{raw}' for {name}"))
        }),
        None => Ok(None),
    }
}

/// Applies environment variable overrides using the PHARMAGATE_* prefix
///
/// Variables follow the pattern `PHARMAGATE_<SECTION>_<KEY>`, for example
/// `PHARMAGATE_GATEWAY_HOST` or `PHARMAGATE_WATCHER_DIRECTORY`.
fn apply_env_overrides(config: &mut PharmaGateConfig) -> Result<()> {
    // Application
    if let Some(val) = env("PHARMAGATE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_parsed("PHARMAGATE_APPLICATION_DRY_RUN")? {
        config.application.dry_run = val;
    }

    // Gateway
    if let Some(val) = env("PHARMAGATE_GATEWAY_HOST") {
        config.gateway.host = val;
    }
    if let Some(val) = env_parsed("PHARMAGATE_GATEWAY_PORT")? {
        config.gateway.port = val;
    }
    if let Some(val) = env("PHARMAGATE_GATEWAY_WRITE_MODE") {
        config.gateway.write_mode = match val.as_str() {
            "wait_for_ack" => WriteMode::WaitForAck,
            "fire_and_forget" => WriteMode::FireAndForget,
            other => {
                return Err(PharmaGateError::Configuration(format!(
                    "Invalid PHARMAGATE_GATEWAY_WRITE_MODE '{other}'"
                )))
            }
        };
    }
    if let Some(val) = env("PHARMAGATE_GATEWAY_COMMIT_MODE") {
        config.gateway.commit_mode = match val.as_str() {
            "batch" => CommitMode::Batch,
            "per_record" => CommitMode::PerRecord,
            other => {
                return Err(PharmaGateError::Configuration(format!(
                    "Invalid PHARMAGATE_GATEWAY_COMMIT_MODE '{other}'"
                )))
            }
        };
    }
    if let Some(val) = env_parsed("PHARMAGATE_GATEWAY_SEND_EOF")? {
        config.gateway.send_eof = val;
    }
    if let Some(val) = env_parsed("PHARMAGATE_GATEWAY_DEBUG_LOGGING")? {
        config.gateway.debug_logging = val;
    }
    if let Some(val) = env_parsed("PHARMAGATE_GATEWAY_TIMEOUT_SECONDS")? {
        config.gateway.timeout_seconds = val;
    }

    // Watcher
    if let Some(val) = env_parsed("PHARMAGATE_WATCHER_ENABLED")? {
        config.watcher.enabled = val;
    }
    if let Some(val) = env("PHARMAGATE_WATCHER_DIRECTORY") {
        config.watcher.directory = val;
    }
    if let Some(val) = env_parsed("PHARMAGATE_WATCHER_POLL_INTERVAL_MS")? {
        config.watcher.poll_interval_ms = val;
    }
    if let Some(val) = env("PHARMAGATE_WATCHER_RUN_MODE") {
        config.watcher.run_mode = match val.as_str() {
            "blocking" => RunMode::Blocking,
            "async" => RunMode::Async,
            other => {
                return Err(PharmaGateError::Configuration(format!(
                    "Invalid PHARMAGATE_WATCHER_RUN_MODE '{other}'"
                )))
            }
        };
    }
    if let Some(val) = env("PHARMAGATE_WATCHER_FORMAT") {
        config.watcher.format = val;
    }

    // Listener
    if let Some(val) = env_parsed("PHARMAGATE_LISTENER_ENABLED")? {
        config.listener.enabled = val;
    }
    if let Some(val) = env("PHARMAGATE_LISTENER_BIND_ADDRESS") {
        config.listener.bind_address = val;
    }
    if let Some(val) = env_parsed("PHARMAGATE_LISTENER_PORT")? {
        config.listener.port = val;
    }
    if let Some(val) = env("PHARMAGATE_LISTENER_FORMAT") {
        config.listener.format = val;
    }
    if let Some(val) = env_parsed("PHARMAGATE_LISTENER_MAX_MESSAGE_BYTES")? {
        config.listener.max_message_bytes = val;
    }
    if let Some(val) = env_parsed("PHARMAGATE_LISTENER_TLS_ENABLED")? {
        config.listener.tls_enabled = val;
    }
    if let Some(val) = env("PHARMAGATE_LISTENER_TLS_IDENTITY_PATH") {
        config.listener.tls_identity_path = Some(val);
    }
    if let Some(val) = env("PHARMAGATE_LISTENER_TLS_IDENTITY_PASSWORD") {
        config.listener.tls_identity_password = Some(secret_string(val));
    }

    // Logging
    if let Some(val) = env_parsed("PHARMAGATE_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env("PHARMAGATE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
