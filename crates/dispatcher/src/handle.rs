//! SinkHandle - owns one sink and isolates its failures from the pipeline

use tracing::{debug, error, instrument};

use contracts::{DataSink, Observation};

use crate::metrics::{MetricsSnapshot, SinkMetrics};

/// Handle around a single sink.
///
/// Errors from the sink are logged and counted here and never propagate to
/// the caller, so one failing backend cannot stop the pipeline or the other
/// backend.
pub struct SinkHandle<S> {
    /// Sink name
    name: String,
    /// Wrapped sink
    sink: S,
    /// Per-sink counters
    metrics: SinkMetrics,
}

impl<S: DataSink> SinkHandle<S> {
    /// Wrap a sink
    pub fn new(sink: S) -> Self {
        Self {
            name: sink.name().to_string(),
            sink,
            metrics: SinkMetrics::new(),
        }
    }

    /// Get sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Borrow the wrapped sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Get current metrics
    pub fn metrics(&self) -> &SinkMetrics {
        &self.metrics
    }

    /// Offer one observation to the sink.
    ///
    /// Returns true if the sink accepted it.
    pub async fn offer(&mut self, observation: &Observation) -> bool {
        let accepted = match self.sink.write(observation).await {
            Ok(()) => {
                self.metrics.inc_write_count();
                true
            }
            Err(e) => {
                self.metrics.inc_failure_count();
                error!(
                    sink = %self.name,
                    icao = observation.icao(),
                    error = %e,
                    "Write failed"
                );
                false
            }
        };
        observability::record_sink_write(&self.name, accepted);
        accepted
    }

    /// Ask the sink to persist anything it buffers
    pub async fn flush(&mut self) -> bool {
        match self.sink.flush().await {
            Ok(()) => {
                self.metrics.inc_flush_count();
                true
            }
            Err(e) => {
                self.metrics.inc_flush_failure_count();
                error!(sink = %self.name, error = %e, "Flush failed");
                false
            }
        }
    }

    /// Close the sink and return its final counters
    #[instrument(name = "sink_handle_shutdown", skip(self), fields(sink = %self.name))]
    pub async fn shutdown(mut self) -> MetricsSnapshot {
        if let Err(e) = self.sink.close().await {
            error!(sink = %self.name, error = %e, "Close failed on shutdown");
        }
        debug!(sink = %self.name, "SinkHandle shutdown complete");
        self.metrics.snapshot()
    }
}
