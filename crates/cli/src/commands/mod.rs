//! Command implementations.

mod info;
mod run;
mod validate;

pub use info::run_info;
pub use run::run_pipeline;
pub use validate::run_validate;

use std::path::Path;

use contracts::LoggerConfig;
use tracing::info;

use crate::error::{CliError, Result};

/// Load a config file, or fall back to defaults when no path is given
pub(crate) fn load_config(path: Option<&Path>) -> Result<LoggerConfig> {
    match path {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::config_not_found(path.display().to_string()));
            }
            info!(config = %path.display(), "Loading configuration");
            Ok(config_loader::ConfigLoader::load_from_path(path)?)
        }
        None => {
            info!("No configuration file given, using defaults");
            Ok(LoggerConfig::default())
        }
    }
}
