//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables should be run with --test-threads=1
//! to avoid interference between tests.

use pharmagate::config::{load_config, CommitMode, RunMode, WriteMode};
use pharmagate::domain::InputFormat;
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("PHARMAGATE_APPLICATION_LOG_LEVEL");
    std::env::remove_var("PHARMAGATE_APPLICATION_DRY_RUN");
    std::env::remove_var("PHARMAGATE_GATEWAY_HOST");
    std::env::remove_var("PHARMAGATE_GATEWAY_COMMIT_MODE");
    std::env::remove_var("PHARMAGATE_WATCHER_FORMAT");
    std::env::remove_var("PHARMAGATE_LISTENER_MAX_MESSAGE_BYTES");
    std::env::remove_var("TEST_TLS_PASSWORD");
}

fn write_config(toml_content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    let temp_file = write_config(
        r#"
[application]
log_level = "debug"
dry_run = true

[gateway]
host = "gateway.pharmacy.local"
port = 24042
write_mode = "fire_and_forget"
commit_mode = "per_record"
send_eof = false
debug_logging = true
timeout_seconds = 10

[watcher]
enabled = true
directory = "/srv/pharmagate/inbound"
poll_interval_ms = 250
run_mode = "async"
format = "dispill"

[listener]
enabled = true
bind_address = "127.0.0.1"
port = 24045
format = "auto"
read_timeout_ms = 750
response_host = "pharmacy-host.local"
response_port = 24046

[logging]
local_enabled = false
local_path = "/tmp/pharmagate"
local_rotation = "hourly"
file_prefix = "gateway"
"#,
    );

    let config = load_config(temp_file.path()).expect("Failed to load config");

    // Verify application config
    assert_eq!(config.application.log_level, "debug");
    assert!(config.application.dry_run);

    // Verify gateway config
    assert_eq!(config.gateway.address(), "gateway.pharmacy.local:24042");
    assert_eq!(config.gateway.write_mode, WriteMode::FireAndForget);
    assert_eq!(config.gateway.commit_mode, CommitMode::PerRecord);
    assert!(!config.gateway.send_eof);
    assert!(config.gateway.debug_logging);
    assert_eq!(config.gateway.timeout_seconds, 10);

    // Verify watcher config
    assert!(config.watcher.enabled);
    assert_eq!(config.watcher.poll_interval_ms, 250);
    assert_eq!(config.watcher.run_mode, RunMode::Async);
    assert_eq!(config.watcher.format_hint(), Some(InputFormat::Dispill));

    // Verify listener config
    assert_eq!(config.listener.port, 24045);
    assert_eq!(config.listener.format_hint(), None);
    assert_eq!(config.listener.read_timeout_ms, 750);
    assert_eq!(config.listener.response_port, Some(24046));

    // Verify logging config
    assert!(!config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");
    assert_eq!(config.logging.file_prefix, "gateway");
}

#[test]
fn test_load_minimal_config_with_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    let temp_file = write_config(
        r#"
[gateway]
host = "localhost"
port = 24042
"#,
    );

    let config = load_config(temp_file.path()).expect("Failed to load config");

    // Verify defaults are applied
    assert_eq!(config.application.log_level, "info");
    assert!(!config.application.dry_run);
    assert_eq!(config.gateway.write_mode, WriteMode::WaitForAck);
    assert_eq!(config.gateway.commit_mode, CommitMode::Batch);
    assert!(config.gateway.send_eof);
    assert_eq!(config.gateway.timeout_seconds, 30);
    assert!(!config.watcher.enabled);
    assert_eq!(config.watcher.poll_interval_ms, 1000);
    assert_eq!(config.watcher.run_mode, RunMode::Blocking);
    assert!(!config.listener.enabled);
    assert_eq!(config.listener.bind_address, "0.0.0.0");
    assert!(!config.listener.tls_enabled);
    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_path, "/var/log/pharmagate");
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_TLS_PASSWORD", "p12-secret");

    let temp_file = write_config(
        r#"
[gateway]
host = "localhost"
port = 24042

[listener]
tls_enabled = true
tls_identity_path = "/etc/pharmagate/listener.p12"
tls_identity_password = "${TEST_TLS_PASSWORD}"
"#,
    );

    let config = load_config(temp_file.path()).expect("Failed to load config");

    let password = config.listener.tls_identity_password.as_ref().unwrap();
    assert_eq!(password.expose_secret().as_ref(), "p12-secret");
    // Debug output never shows the secret
    assert!(!format!("{:?}", config.listener).contains("p12-secret"));

    std::env::remove_var("TEST_TLS_PASSWORD");
}

#[test]
fn test_missing_env_var_is_reported() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let temp_file = write_config(
        r#"
[gateway]
host = "${TEST_TLS_PASSWORD}"
port = 24042
"#,
    );

    let err = load_config(temp_file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_TLS_PASSWORD"));
}

#[test]
fn test_env_var_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("PHARMAGATE_APPLICATION_LOG_LEVEL", "trace");
    std::env::set_var("PHARMAGATE_GATEWAY_HOST", "override.local");
    std::env::set_var("PHARMAGATE_GATEWAY_COMMIT_MODE", "per_record");
    std::env::set_var("PHARMAGATE_WATCHER_FORMAT", "oasis");
    std::env::set_var("PHARMAGATE_LISTENER_MAX_MESSAGE_BYTES", "65536");

    let temp_file = write_config(
        r#"
[application]
log_level = "info"

[gateway]
host = "localhost"
port = 24042
commit_mode = "batch"
"#,
    );

    let config = load_config(temp_file.path()).expect("Failed to load config");

    // Verify env var overrides took effect
    assert_eq!(config.application.log_level, "trace");
    assert_eq!(config.gateway.host, "override.local");
    assert_eq!(config.gateway.commit_mode, CommitMode::PerRecord);
    assert_eq!(config.watcher.format_hint(), Some(InputFormat::Oasis));
    assert_eq!(config.listener.max_message_bytes, 65536);

    cleanup_env_vars();
}

#[test]
fn test_invalid_config_validation() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let cases = [
        // Bad log level
        "[application]\nlog_level = \"loud\"\n[gateway]\nhost = \"h\"\nport = 1\n",
        // Gateway port 0
        "[gateway]\nhost = \"h\"\nport = 0\n",
        // Unknown format
        "[gateway]\nhost = \"h\"\nport = 1\n[watcher]\nformat = \"csv\"\n",
        // Enabled watcher without a directory
        "[gateway]\nhost = \"h\"\nport = 1\n[watcher]\nenabled = true\n",
        // TLS without an identity
        "[gateway]\nhost = \"h\"\nport = 1\n[listener]\ntls_enabled = true\n",
        // Response host without port
        "[gateway]\nhost = \"h\"\nport = 1\n[listener]\nresponse_host = \"r\"\n",
        // Unknown rotation
        "[gateway]\nhost = \"h\"\nport = 1\n[logging]\nlocal_rotation = \"size\"\n",
    ];

    for toml_content in cases {
        let temp_file = write_config(toml_content);
        assert!(load_config(temp_file.path()).is_err(), "{toml_content}");
    }
}

#[test]
fn test_missing_gateway_section() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let temp_file = write_config("[application]\nlog_level = \"info\"\n");
    assert!(load_config(temp_file.path()).is_err());
}
