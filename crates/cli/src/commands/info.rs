//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::{Classification, LoggerConfig};
use dispatcher::CSV_HEADER;

use crate::cli::InfoArgs;
use crate::commands::load_config;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo<'a> {
    config: &'a LoggerConfig,
    csv_columns: [&'static str; 8],
    classifications: Vec<&'static str>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = ?args.config, "Loading configuration info");

    let config = load_config(args.config.as_deref())
        .context("Failed to load configuration")?;

    if args.json {
        let info = ConfigInfo {
            config: &config,
            csv_columns: CSV_HEADER,
            classifications: Classification::ALL.iter().map(|c| c.as_str()).collect(),
        };
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else if args.toml {
        let toml = config_loader::ConfigLoader::to_toml(&config)
            .context("Failed to serialize config as TOML")?;
        print!("{}", toml);
    } else {
        print_config_info(&config);
    }

    Ok(())
}

fn print_config_info(config: &LoggerConfig) {
    println!("=== SBS Logger Configuration ===\n");

    println!("Feed");
    println!("   ├─ Address: {}", config.feed.addr());
    println!("   └─ Read buffer: {} bytes", config.feed.read_buffer_size);

    println!("\nCSV (batched)");
    println!("   ├─ Path: {}", config.csv.path.display());
    println!("   ├─ Batch size: {}", config.csv.batch_size);
    println!("   └─ Columns: {}", CSV_HEADER.join(","));

    println!("\nSQLite (immediate)");
    if config.sqlite.enabled {
        println!("   ├─ Path: {}", config.sqlite.path.display());
        println!("   └─ Table: adsb");
    } else {
        println!("   └─ Disabled");
    }

    println!("\nConsole");
    println!("   └─ Echo: {}", config.console.echo);

    let labels: Vec<&str> = Classification::ALL.iter().map(|c| c.as_str()).collect();
    println!("\nClassifications: {}", labels.join(", "));
    println!();
}
