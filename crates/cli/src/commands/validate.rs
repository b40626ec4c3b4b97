//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::LoggerConfig;

use crate::cli::ValidateArgs;
use crate::commands::load_config;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    feed: String,
    csv_path: String,
    batch_size: usize,
    sqlite_path: Option<String>,
    echo: bool,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    match load_config(Some(&args.config)) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    feed: config.feed.addr(),
                    csv_path: config.csv.path.display().to_string(),
                    batch_size: config.csv.batch_size,
                    sqlite_path: config
                        .sqlite
                        .enabled
                        .then(|| config.sqlite.path.display().to_string()),
                    echo: config.console.echo,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &LoggerConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if !config.sqlite.enabled {
        warnings.push("SQLite backend disabled - only batched CSV output is kept".to_string());
    }

    if config.csv.batch_size == 1 {
        warnings.push("csv.batch_size is 1 - every observation appends to the CSV file".to_string());
    }

    if config.sqlite.enabled && config.sqlite.path == config.csv.path {
        warnings.push(format!(
            "CSV and SQLite share the same path: {}",
            config.csv.path.display()
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Feed: {}", summary.feed);
            println!("  CSV: {} (batch {})", summary.csv_path, summary.batch_size);
            match &summary.sqlite_path {
                Some(path) => println!("  SQLite: {}", path),
                None => println!("  SQLite: disabled"),
            }
            println!("  Echo: {}", summary.echo);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
