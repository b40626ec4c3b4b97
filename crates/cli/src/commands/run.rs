//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

use contracts::LoggerConfig;
use sbs_logger_cli::{Pipeline, PipelineConfig};

use crate::cli::RunArgs;
use crate::commands::load_config;

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    let logger = resolve_config(args)?;

    info!(
        feed = %logger.feed.addr(),
        csv = %logger.csv.path.display(),
        batch_size = logger.csv.batch_size,
        sqlite = %logger.sqlite.path.display(),
        sqlite_enabled = logger.sqlite.enabled,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&logger);
        return Ok(());
    }

    let pipeline_config = PipelineConfig {
        logger,
        replay_path: args.replay.clone(),
        max_records: (args.max_records > 0).then_some(args.max_records),
        timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
    };

    info!("Starting pipeline...");
    let stats = Pipeline::new(pipeline_config)
        .run(shutdown_signal())
        .await
        .context("Pipeline failed to start")?;

    info!(
        records = stats.records_parsed,
        lines = stats.lines_read,
        duration_secs = stats.duration.as_secs_f64(),
        rate = format!("{:.2}", stats.records_per_sec()),
        "Pipeline completed"
    );
    stats.print_summary();

    info!("SBS Logger finished");
    Ok(())
}

/// Config file (or defaults) with command-line overrides applied, validated
fn resolve_config(args: &RunArgs) -> Result<LoggerConfig> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, args);
    config_loader::validate(&config).context("Invalid configuration after CLI overrides")?;
    Ok(config)
}

fn apply_overrides(config: &mut LoggerConfig, args: &RunArgs) {
    if let Some(host) = &args.host {
        info!(host = %host, "Overriding feed host from CLI");
        config.feed.host = host.clone();
    }
    if let Some(port) = args.port {
        info!(port, "Overriding feed port from CLI");
        config.feed.port = port;
    }
    if let Some(path) = &args.csv {
        config.csv.path = path.clone();
    }
    if let Some(path) = &args.sqlite {
        config.sqlite.path = path.clone();
    }
    if args.no_sqlite {
        config.sqlite.enabled = false;
    }
    if let Some(batch) = args.batch {
        config.csv.batch_size = batch;
    }
    if args.no_echo {
        config.console.echo = false;
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &LoggerConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Feed: {}", config.feed.addr());
    println!("  Read buffer: {} bytes", config.feed.read_buffer_size);
    println!("CSV: {}", config.csv.path.display());
    println!("  Batch size: {}", config.csv.batch_size);
    if config.sqlite.enabled {
        println!("SQLite: {}", config.sqlite.path.display());
    } else {
        println!("SQLite: disabled");
    }
    println!("Console echo: {}", config.console.echo);
    println!();
}
