//! LoggerConfig - Config Loader output
//!
//! Immutable configuration built once at startup and handed to the pipeline:
//! feed endpoint, batched CSV output, immediate SQLite output, console echo.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete logger configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Feed transport settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Batched CSV backend
    #[serde(default)]
    pub csv: CsvConfig,

    /// Immediate SQLite backend
    #[serde(default)]
    pub sqlite: SqliteConfig,

    /// Console echo of each observation
    #[serde(default)]
    pub console: ConsoleConfig,
}

/// SBS feed endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Decoder host
    #[serde(default = "default_feed_host")]
    pub host: String,

    /// SBS (BaseStation) port
    #[serde(default = "default_feed_port")]
    pub port: u16,

    /// Maximum bytes per transport read
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
}

impl FeedConfig {
    /// `host:port` string used for connecting and logging
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            host: default_feed_host(),
            port: default_feed_port(),
            read_buffer_size: default_read_buffer_size(),
        }
    }
}

fn default_feed_host() -> String {
    "127.0.0.1".to_string()
}

fn default_feed_port() -> u16 {
    30003
}

fn default_read_buffer_size() -> usize {
    4096
}

/// Batched CSV output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvConfig {
    /// Output file (appended across sessions)
    #[serde(default = "default_csv_path")]
    pub path: PathBuf,

    /// Pending observations that trigger a flush
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            path: default_csv_path(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("adsb_data.csv")
}

fn default_batch_size() -> usize {
    50
}

/// Immediate SQLite output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Database file (created if missing)
    #[serde(default = "default_sqlite_path")]
    pub path: PathBuf,

    /// Whether the backend is active at all
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: default_sqlite_path(),
            enabled: true,
        }
    }
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("adsb_data.sqlite")
}

fn default_true() -> bool {
    true
}

/// Console output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Log one line per observation
    #[serde(default = "default_true")]
    pub echo: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self { echo: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoggerConfig::default();
        assert_eq!(config.feed.addr(), "127.0.0.1:30003");
        assert_eq!(config.feed.read_buffer_size, 4096);
        assert_eq!(config.csv.path, PathBuf::from("adsb_data.csv"));
        assert_eq!(config.csv.batch_size, 50);
        assert_eq!(config.sqlite.path, PathBuf::from("adsb_data.sqlite"));
        assert!(config.sqlite.enabled);
        assert!(config.console.echo);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: LoggerConfig =
            serde_json::from_str(r#"{ "feed": { "port": 40003 }, "sqlite": { "enabled": false } }"#)
                .unwrap();
        assert_eq!(config.feed.host, "127.0.0.1");
        assert_eq!(config.feed.port, 40003);
        assert!(!config.sqlite.enabled);
        assert_eq!(config.csv.batch_size, 50);
    }
}
