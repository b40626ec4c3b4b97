//! LineStream - lazy sequence of complete lines from a chunk source

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::config::IngestionMetrics;
use crate::error::{IngestionError, Result};
use crate::reassembler::LineReassembler;
use crate::source::ChunkSource;

/// Couples a [`ChunkSource`] with a [`LineReassembler`].
///
/// Chunks are pulled only when no complete line is buffered. The sequence
/// ends (`Ok(None)`) once the source delivers an empty chunk; a fragment left
/// without a terminating newline at that point is discarded.
pub struct LineStream<S> {
    source: S,
    reassembler: LineReassembler,
    ready: VecDeque<String>,
    closed: bool,
    metrics: IngestionMetrics,
}

impl<S: ChunkSource> LineStream<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            reassembler: LineReassembler::new(),
            ready: VecDeque::new(),
            closed: false,
            metrics: IngestionMetrics::new(),
        }
    }

    /// Next complete line, without its `\n`.
    ///
    /// Cancel-safe: lines already reassembled stay buffered if the returned
    /// future is dropped while waiting on the source.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                return Ok(Some(line));
            }
            if self.closed {
                return Ok(None);
            }

            let chunk = self
                .source
                .read_chunk()
                .await
                .map_err(IngestionError::Read)?;

            if chunk.is_empty() {
                self.close_stream();
                continue;
            }

            self.metrics.record_chunk(chunk.len());
            let lines = self.reassembler.push(&chunk);
            trace!(len = chunk.len(), lines = lines.len(), "chunk reassembled");
            self.metrics.record_lines(lines.len());
            self.ready.extend(lines);
        }
    }

    /// Whether the source has signalled close
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn origin(&self) -> &str {
        self.source.origin()
    }

    pub fn metrics(&self) -> &IngestionMetrics {
        &self.metrics
    }

    /// Release the stream, handing back the source
    pub fn into_source(self) -> S {
        self.source
    }

    fn close_stream(&mut self) {
        self.closed = true;
        if let Some(rest) = self.reassembler.take_remainder() {
            self.metrics.record_discarded_tail(rest.len());
            debug!(
                origin = %self.source.origin(),
                bytes = rest.len(),
                "Discarding unterminated tail at close"
            );
        }
        debug!(origin = %self.source.origin(), "Feed closed by remote");
    }
}
