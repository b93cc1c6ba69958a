//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for PharmaGate using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// PharmaGate - Pharmacy data interchange gateway
#[derive(Parser, Debug)]
#[command(name = "pharmagate")]
#[command(version, about, long_about = None)]
#[command(author = "PharmaGate Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "pharmagate.toml", env = "PHARMAGATE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PHARMAGATE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the directory watcher and/or socket listener
    Serve(commands::serve::ServeArgs),

    /// Ingest a single file and commit it to the gateway
    Parse(commands::parse::ParseArgs),

    /// Show which format a file would be decoded as
    Detect(commands::detect::DetectArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

impl Commands {
    /// Whether the command runs long enough to warrant file logging
    pub fn is_service(&self) -> bool {
        matches!(self, Commands::Serve(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_serve() {
        let cli = Cli::parse_from(["pharmagate", "serve"]);
        assert_eq!(cli.config, "pharmagate.toml");
        assert!(matches!(cli.command, Commands::Serve(_)));
        assert!(cli.command.is_service());
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["pharmagate", "--config", "custom.toml", "serve"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["pharmagate", "--log-level", "debug", "serve"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_parse() {
        let cli = Cli::parse_from([
            "pharmagate",
            "parse",
            "--format",
            "dispill",
            "--dry-run",
            "batch.txt",
        ]);
        match cli.command {
            Commands::Parse(args) => {
                assert_eq!(args.file.to_str(), Some("batch.txt"));
                assert_eq!(args.format, "dispill");
                assert!(args.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_detect() {
        let cli = Cli::parse_from(["pharmagate", "detect", "input.dat"]);
        assert!(matches!(cli.command, Commands::Detect(_)));
        assert!(!cli.command.is_service());
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["pharmagate", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["pharmagate", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
