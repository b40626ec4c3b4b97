//! # Dispatcher
//!
//! 数据持久化模块。
//!
//! 负责：
//! - 消费 `Observation`
//! - 按到达顺序交给即时 sink (SQLite) 与批量 sink (CSV)
//! - 隔离 sink 故障，任何一个 sink 失败都不影响另一个
//! - 关闭时执行且仅执行一次最终刷新

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod sinks;

pub use contracts::{DataSink, Observation};
pub use dispatcher::{DrainReport, Dispatcher, DispatcherBuilder, OfferOutcome};
pub use error::DispatcherError;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{CsvBatchSink, LogSink, SqliteSink, CSV_HEADER};
