//! Line stream metrics

/// Ingestion metrics
///
/// Owned by the [`LineStream`](crate::LineStream); the pipeline is
/// single-threaded so plain counters are enough.
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Total chunks read from the feed
    chunks_received: u64,

    /// Total bytes read from the feed
    bytes_received: u64,

    /// Complete lines produced
    lines_emitted: u64,

    /// Bytes of an unterminated tail discarded at close
    tail_bytes_discarded: u64,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one chunk read
    pub fn record_chunk(&mut self, len: usize) {
        self.chunks_received += 1;
        self.bytes_received += len as u64;
    }

    /// Record lines produced from a chunk
    pub fn record_lines(&mut self, count: usize) {
        self.lines_emitted += count as u64;
    }

    /// Record a discarded unterminated tail
    pub fn record_discarded_tail(&mut self, len: usize) {
        self.tail_bytes_discarded += len as u64;
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            chunks_received: self.chunks_received,
            bytes_received: self.bytes_received,
            lines_emitted: self.lines_emitted,
            tail_bytes_discarded: self.tail_bytes_discarded,
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Total chunks read from the feed
    pub chunks_received: u64,

    /// Total bytes read from the feed
    pub bytes_received: u64,

    /// Complete lines produced
    pub lines_emitted: u64,

    /// Bytes of an unterminated tail discarded at close
    pub tail_bytes_discarded: u64,
}
