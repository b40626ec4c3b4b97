//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// SBS Logger - records an SBS/ADS-B feed to CSV and SQLite
#[derive(Parser, Debug)]
#[command(
    name = "sbs-logger",
    author,
    version,
    about = "SBS/ADS-B feed logger",
    long_about = "Connects to the SBS (BaseStation) output of a dump1090-style decoder,\n\
                  classifies every position report by altitude and speed, and records\n\
                  each observation to SQLite immediately and to CSV in batches."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "SBS_LOGGER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "SBS_LOGGER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the logger
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display the effective configuration
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone, Default)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); defaults apply when omitted
    #[arg(short, long, env = "SBS_LOGGER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override decoder host
    #[arg(long, env = "SBS_HOST")]
    pub host: Option<String>,

    /// Override SBS port
    #[arg(long, env = "SBS_PORT")]
    pub port: Option<u16>,

    /// Override CSV output file
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Override SQLite database file
    #[arg(long)]
    pub sqlite: Option<PathBuf>,

    /// Disable the SQLite backend
    #[arg(long)]
    pub no_sqlite: bool,

    /// Override CSV batch size
    #[arg(long)]
    pub batch: Option<usize>,

    /// Do not log a line per observation
    #[arg(long)]
    pub no_echo: bool,

    /// Replay a recorded SBS capture instead of connecting
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Stop after this many parsed records (0 = unlimited)
    #[arg(long, default_value = "0", env = "SBS_LOGGER_MAX_RECORDS")]
    pub max_records: u64,

    /// Stop after this many seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "SBS_LOGGER_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without connecting
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "SBS_LOGGER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file; defaults are shown when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the effective configuration as a TOML document
    #[arg(long, conflicts_with = "json")]
    pub toml: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from([
            "sbs-logger",
            "run",
            "--host",
            "10.0.0.2",
            "--port",
            "40003",
            "--no-sqlite",
            "--batch",
            "10",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.host.as_deref(), Some("10.0.0.2"));
        assert_eq!(args.port, Some(40003));
        assert!(args.no_sqlite);
        assert_eq!(args.batch, Some(10));
        assert_eq!(args.max_records, 0);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["sbs-logger", "-q", "-v", "info"]).is_err());
    }
}
