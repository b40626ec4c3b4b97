//! # Ingestion Pipeline
//!
//! SBS feed ingestion module.
//!
//! Responsibilities:
//! - Pull raw byte chunks from a feed (TCP, recorded capture, or scripted)
//! - Reassemble complete lines across chunk boundaries
//! - Parse `MSG` lines into `PositionReport`s, skipping everything else
//! - Tolerant numeric parsing of the report fields
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{parse_line, LineStream, ParseOutcome, TcpFeed};
//!
//! let feed = TcpFeed::connect("127.0.0.1", 30003, 4096).await?;
//! let mut lines = LineStream::new(feed);
//!
//! while let Some(line) = lines.next_line().await? {
//!     if let ParseOutcome::Parsed(report) = parse_line(line.trim()) {
//!         // classify + persist
//!     }
//! }
//! ```
//!
//! ## Mock Testing
//!
//! ```ignore
//! use ingestion::ScriptedFeed;
//!
//! let feed = ScriptedFeed::new().chunk("MSG,3,1,1,4CA2D1,...\n");
//! ```

mod config;
mod error;
mod mock;
mod numeric;
mod parser;
mod reassembler;
mod source;
mod stream;

// Re-exports
pub use config::{IngestionMetrics, MetricsSnapshot};
pub use contracts::PositionReport;
pub use error::{IngestionError, Result};
pub use mock::ScriptedFeed;
pub use numeric::parse_number;
pub use parser::{parse_line, ParseOutcome, SkipReason, MIN_FIELDS, RECORD_MARKER};
pub use reassembler::LineReassembler;
pub use source::{ChunkSource, LocalChunkSource, ReaderFeed, ReplayFeed, TcpFeed, DEFAULT_READ_SIZE};
pub use stream::LineStream;
