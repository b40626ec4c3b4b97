//! 配置校验模块
//!
//! 校验规则：
//! - feed.host 非空, feed.port > 0
//! - feed.read_buffer_size > 0
//! - csv.path 非空, csv.batch_size > 0
//! - sqlite.path 非空 (仅在启用时)

use contracts::{ContractError, LoggerConfig};

/// 校验 LoggerConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &LoggerConfig) -> Result<(), ContractError> {
    validate_feed(config)?;
    validate_csv(config)?;
    validate_sqlite(config)?;
    Ok(())
}

/// 校验数据源配置
fn validate_feed(config: &LoggerConfig) -> Result<(), ContractError> {
    let feed = &config.feed;

    if feed.host.trim().is_empty() {
        return Err(ContractError::config_validation(
            "feed.host",
            "host cannot be empty",
        ));
    }

    if feed.port == 0 {
        return Err(ContractError::config_validation(
            "feed.port",
            "port must be > 0",
        ));
    }

    if feed.read_buffer_size == 0 {
        return Err(ContractError::config_validation(
            "feed.read_buffer_size",
            "read_buffer_size must be > 0",
        ));
    }

    Ok(())
}

/// 校验 CSV 输出配置
fn validate_csv(config: &LoggerConfig) -> Result<(), ContractError> {
    if config.csv.path.as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "csv.path",
            "path cannot be empty",
        ));
    }

    if config.csv.batch_size == 0 {
        return Err(ContractError::config_validation(
            "csv.batch_size",
            "batch_size must be > 0",
        ));
    }

    Ok(())
}

/// 校验 SQLite 输出配置
fn validate_sqlite(config: &LoggerConfig) -> Result<(), ContractError> {
    if config.sqlite.enabled && config.sqlite.path.as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "sqlite.path",
            "path cannot be empty when sqlite is enabled",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_config() {
        let config = LoggerConfig::default();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_host() {
        let mut config = LoggerConfig::default();
        config.feed.host = "  ".into();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("host cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_zero_port() {
        let mut config = LoggerConfig::default();
        config.feed.port = 0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("port must be > 0"), "got: {err}");
    }

    #[test]
    fn test_zero_read_buffer() {
        let mut config = LoggerConfig::default();
        config.feed.read_buffer_size = 0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("read_buffer_size"), "got: {err}");
    }

    #[test]
    fn test_zero_batch_size() {
        let mut config = LoggerConfig::default();
        config.csv.batch_size = 0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("batch_size must be > 0"), "got: {err}");
    }

    #[test]
    fn test_empty_csv_path() {
        let mut config = LoggerConfig::default();
        config.csv.path = PathBuf::new();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("csv.path"), "got: {err}");
    }

    #[test]
    fn test_sqlite_path_only_checked_when_enabled() {
        let mut config = LoggerConfig::default();
        config.sqlite.path = PathBuf::new();
        assert!(validate(&config).is_err());

        config.sqlite.enabled = false;
        assert!(validate(&config).is_ok());
    }
}
