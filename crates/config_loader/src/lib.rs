//! # Config Loader
//!
//! Reads the logger configuration from TOML or JSON, fills missing sections
//! with defaults and validates the result into a `LoggerConfig`.
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("sbs-logger.toml")).unwrap();
//! println!("Feed: {}", config.feed.addr());
//! ```

mod validator;

pub use contracts::LoggerConfig;
pub use validator::validate;

use contracts::ContractError;
use std::path::Path;

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Format for a file extension, case-insensitive
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
        }
    }

    /// Deserialize without validating. Absent sections take their defaults.
    fn decode(self, content: &str) -> Result<LoggerConfig, ContractError> {
        let result: Result<LoggerConfig, Box<dyn std::error::Error + Send + Sync>> = match self {
            Self::Toml => toml::from_str(content).map_err(Into::into),
            Self::Json => serde_json::from_str(content).map_err(Into::into),
        };

        result.map_err(|e| ContractError::ConfigParse {
            message: format!("{} parse error: {e}", self.label()),
            source: Some(e),
        })
    }
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a `.toml` or `.json` file.
    ///
    /// Parse errors name the file they came from.
    pub fn load_from_path(path: &Path) -> Result<LoggerConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = std::fs::read_to_string(path)?;

        Self::load_from_str(&content, format).map_err(|e| match e {
            ContractError::ConfigParse { message, source } => ContractError::ConfigParse {
                message: format!("{}: {message}", path.display()),
                source,
            },
            other => other,
        })
    }

    /// Parse then validate; the first failure wins.
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<LoggerConfig, ContractError> {
        let config = format.decode(content)?;
        validator::validate(&config)?;
        Ok(config)
    }

    /// Render a config as TOML, the shape `load_from_str` accepts back
    pub fn to_toml(config: &LoggerConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }
}
