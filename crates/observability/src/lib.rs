//! # Observability
//!
//! 日志与指标：tracing 订阅器 + Prometheus 导出。
//!
//! - `init_logging`: 安装全局 tracing 订阅器（JSON/Pretty/Compact）
//! - `install_metrics_exporter`: 启动 Prometheus HTTP 端点并登记指标说明
//! - `metrics`: 观测记录、跳过行、sink 写入与批量刷新的指标

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

// Re-exports
pub use crate::metrics::{
    describe_metrics, record_batch_flush, record_line_skipped, record_observation,
    record_pending_batch, record_sink_write, FeedMetricsAggregator, MetricsSummary, RunningStats,
    StatsSummary,
};

/// Directives appended to the default level when `RUST_LOG` is unset.
///
/// sqlx logs every statement at info, one per SQLite insert.
const QUIET_DEPENDENCIES: &[&str] = &["sqlx=warn"];

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 输出格式
    pub format: LogFormat,
    /// 默认日志级别 (RUST_LOG 未设置时生效)
    pub default_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            default_level: "info".to_string(),
        }
    }
}

/// 日志格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON 结构化日志
    #[default]
    Json,
    /// 人类可读多行格式
    Pretty,
    /// 紧凑单行格式
    Compact,
}

/// Filter used when `RUST_LOG` is not set
pub fn default_directives(level: &str) -> String {
    std::iter::once(level)
        .chain(QUIET_DEPENDENCIES.iter().copied())
        .collect::<Vec<_>>()
        .join(",")
}

/// 安装全局 tracing 订阅器
///
/// Console echo lines go through the same subscriber, so the human-readable
/// formats drop the target column.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.default_level)));

    let layer = match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().with_target(false).boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(false).boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::debug!(format = ?config.format, level = %config.default_level, "Logging initialized");
    Ok(())
}

/// 启动 Prometheus 端点
///
/// Metric descriptions are registered right after the recorder is installed.
pub fn install_metrics_exporter(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .with_context(|| format!("Failed to install Prometheus recorder on port {port}"))?;

    describe_metrics();
    tracing::info!(port, "Prometheus metrics endpoint initialized");
    Ok(())
}
