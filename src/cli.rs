//! Command line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::services::LogFormat;

/// Turn Arr libraries and curated lists into autobrr filter patterns.
#[derive(Debug, Parser)]
#[command(name = "omegabrr", version)]
pub struct Cli {
    /// Path to the YAML config file
    #[arg(short, long, global = true, env = "OMEGABRR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Build patterns without updating any filter
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Console log format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Update filters from the configured Arr clients once
    Arr,
    /// Update filters from the configured lists once
    Lists,
    /// Serve the HTTP API and update filters on a schedule
    Run,
    /// Print version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_command() {
        let cli = Cli::try_parse_from([
            "omegabrr",
            "arr",
            "--dry-run",
            "-c",
            "/tmp/config.yaml",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.command, Command::Arr);
        assert!(cli.dry_run);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/config.yaml")));
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_command_required() {
        assert!(Cli::try_parse_from(["omegabrr"]).is_err());
    }
}
