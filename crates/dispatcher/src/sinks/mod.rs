//! Sink implementations
//!
//! Contains CsvBatchSink, SqliteSink, and LogSink.

mod csv;
mod log;
mod sqlite;

pub use self::csv::{CsvBatchSink, CSV_HEADER};
pub use self::log::LogSink;
pub use self::sqlite::SqliteSink;
