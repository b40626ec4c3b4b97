//! Dispatcher - fans each observation out to the persistence backends

use tracing::{debug, error, info, instrument, warn};

use contracts::{DataSink, LoggerConfig, Observation};

use crate::error::DispatcherError;
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;
use crate::sinks::{CsvBatchSink, LogSink, SqliteSink};

/// Builder for creating a Dispatcher from the logger configuration
pub struct DispatcherBuilder {
    config: LoggerConfig,
}

impl DispatcherBuilder {
    /// Create a new DispatcherBuilder
    pub fn new(config: LoggerConfig) -> Self {
        Self { config }
    }

    /// Open every configured backend.
    ///
    /// SQLite schema initialization happens here; a database that cannot be
    /// opened is fatal.
    #[instrument(name = "dispatcher_builder_build", skip(self))]
    pub async fn build(self) -> Result<Dispatcher<SqliteSink>, DispatcherError> {
        let batch = CsvBatchSink::new("csv", &self.config.csv);

        let immediate = if self.config.sqlite.enabled {
            let sink = SqliteSink::open("sqlite", &self.config.sqlite)
                .await
                .map_err(|e| DispatcherError::sink_creation("sqlite", e.to_string()))?;
            Some(sink)
        } else {
            info!("SQLite backend disabled");
            None
        };

        let echo = self.config.console.echo.then(|| LogSink::new("console"));

        info!(
            csv = %self.config.csv.path.display(),
            batch_size = self.config.csv.batch_size,
            sqlite = self.config.sqlite.enabled,
            echo = self.config.console.echo,
            "Dispatcher ready"
        );

        Ok(Dispatcher::with_sinks(batch, immediate, echo))
    }
}

/// What happened to one offered observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfferOutcome {
    /// `None` when no immediate backend is configured
    pub immediate: Option<bool>,
    /// Accepted by the batch backend. A failed threshold flush still accepts
    /// the observation and shows up in [`CsvBatchSink::failed_flushes`].
    pub batch: bool,
}

/// Result of the final drain
#[derive(Debug, Clone, Default)]
pub struct DrainReport {
    /// Final counters per sink, in shutdown order
    pub sinks: Vec<(String, MetricsSnapshot)>,
    /// Rows written by the final flush
    pub final_flush_rows: usize,
    /// Observations still pending after the final flush (lost at exit)
    pub unflushed: usize,
    /// Rows appended to the CSV file during the whole session
    pub csv_rows_written: u64,
    /// Failed CSV flush attempts, including the final one
    pub csv_flush_failures: u64,
}

/// The Dispatcher that owns both persistence backends.
///
/// `drain` consumes the dispatcher, so the final flush runs at most once.
pub struct Dispatcher<I = SqliteSink> {
    batch: SinkHandle<CsvBatchSink>,
    immediate: Option<SinkHandle<I>>,
    echo: Option<SinkHandle<LogSink>>,
}

impl<I: DataSink> Dispatcher<I> {
    /// Create a dispatcher with custom sinks
    pub fn with_sinks(batch: CsvBatchSink, immediate: Option<I>, echo: Option<LogSink>) -> Self {
        Self {
            batch: SinkHandle::new(batch),
            immediate: immediate.map(SinkHandle::new),
            echo: echo.map(SinkHandle::new),
        }
    }

    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        let mut metrics = Vec::with_capacity(3);
        if let Some(handle) = &self.immediate {
            metrics.push((handle.name().to_string(), handle.metrics().snapshot()));
        }
        metrics.push((self.batch.name().to_string(), self.batch.metrics().snapshot()));
        if let Some(handle) = &self.echo {
            metrics.push((handle.name().to_string(), handle.metrics().snapshot()));
        }
        metrics
    }

    /// Observations held by the batch backend
    pub fn pending_len(&self) -> usize {
        self.batch.sink().pending_len()
    }

    pub fn immediate(&self) -> Option<&I> {
        self.immediate.as_ref().map(SinkHandle::sink)
    }

    pub fn batch(&self) -> &CsvBatchSink {
        self.batch.sink()
    }

    /// Hand one observation to every backend, in arrival order.
    ///
    /// A failure in one backend is logged and does not prevent delivery to
    /// the others.
    pub async fn offer(&mut self, observation: &Observation) -> OfferOutcome {
        if let Some(echo) = &mut self.echo {
            echo.offer(observation).await;
        }

        let immediate = match &mut self.immediate {
            Some(handle) => Some(handle.offer(observation).await),
            None => None,
        };

        let batch = self.batch.offer(observation).await;

        OfferOutcome { immediate, batch }
    }

    /// Drop the immediate backend without closing it.
    ///
    /// Used after a sink panicked mid-offer, when its state can no longer be
    /// trusted. The batch backend is left untouched for the final flush.
    pub fn discard_immediate(&mut self) {
        if let Some(handle) = self.immediate.take() {
            warn!(sink = %handle.name(), "Discarding immediate backend without close");
        }
    }

    /// Release the immediate backend, then flush the batch backend exactly once.
    #[instrument(name = "dispatcher_drain", skip(self))]
    pub async fn drain(self) -> DrainReport {
        let Self {
            mut batch,
            immediate,
            echo,
        } = self;
        let mut report = DrainReport::default();

        if let Some(handle) = immediate {
            let name = handle.name().to_string();
            report.sinks.push((name, handle.shutdown().await));
        }

        let pending = batch.sink().pending_len();
        batch.flush().await;
        report.unflushed = batch.sink().pending_len();
        report.final_flush_rows = pending - report.unflushed;
        report.csv_rows_written = batch.sink().rows_written();
        report.csv_flush_failures = batch.sink().failed_flushes();

        if report.unflushed > 0 {
            error!(
                sink = %batch.name(),
                unflushed = report.unflushed,
                "Final flush failed, observations were not persisted"
            );
        } else if pending > 0 {
            info!(sink = %batch.name(), rows = pending, "Final batch flushed");
        } else {
            debug!(sink = %batch.name(), "Nothing pending at shutdown");
        }

        let name = batch.name().to_string();
        report.sinks.push((name, batch.shutdown().await));

        if let Some(handle) = echo {
            let name = handle.name().to_string();
            report.sinks.push((name, handle.shutdown().await));
        }

        info!(
            csv_rows = report.csv_rows_written,
            unflushed = report.unflushed,
            "Dispatcher shutdown complete"
        );
        report
    }
}
