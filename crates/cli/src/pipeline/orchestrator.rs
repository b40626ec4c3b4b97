//! Pipeline orchestrator - coordinates all components.
//!
//! Connecting opens the feed and the persistence backends. Running pulls one
//! line at a time and hands each observation to the dispatcher. Every exit
//! from Running goes through a single drain step that consumes the session.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{DataSink, LoggerConfig, Observation};
use dispatcher::{Dispatcher, DispatcherBuilder};
use futures::FutureExt;
use ingestion::{parse_line, ChunkSource, LineStream, ParseOutcome, ReplayFeed, TcpFeed};
use observability::{record_line_skipped, record_observation};
use tracing::{debug, error, info, trace, warn};

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Feed and sink settings
    pub logger: LoggerConfig,

    /// Read a recorded capture instead of connecting to the feed
    pub replay_path: Option<PathBuf>,

    /// Stop after this many parsed records (None = unlimited)
    pub max_records: Option<u64>,

    /// Stop after this long in Running (None = no limit)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Lifecycle of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Connecting,
    Running,
    Draining,
    Closed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connecting => "connecting",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Why the pipeline left Running
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainTrigger {
    /// Feed delivered an empty read
    RemoteClosed,
    /// Ctrl+C, SIGTERM or a caller-supplied stop future
    StopRequested,
    /// Configured run time elapsed
    Timeout,
    /// Configured record count reached
    LimitReached,
    /// Unexpected failure while reading the feed
    Fault(String),
}

impl fmt::Display for DrainTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoteClosed => f.write_str("remote closed"),
            Self::StopRequested => f.write_str("stop requested"),
            Self::Timeout => f.write_str("timeout"),
            Self::LimitReached => f.write_str("record limit reached"),
            Self::Fault(message) => write!(f, "fault: {message}"),
        }
    }
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
    state: PipelineState,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            state: PipelineState::Connecting,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Connect, run until a drain trigger, then drain.
    ///
    /// Only Connecting failures are returned as errors; once Running, every
    /// outcome ends in a drained [`PipelineStats`].
    pub async fn run<F>(self, stop: F) -> Result<PipelineStats>
    where
        F: Future<Output = ()>,
    {
        if let Some(port) = self.config.metrics_port {
            observability::install_metrics_exporter(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let read_size = self.config.logger.feed.read_buffer_size;

        match self.config.replay_path.clone() {
            Some(path) => {
                info!(path = %path.display(), "Running in REPLAY mode");
                let feed = ReplayFeed::open(&path, read_size)
                    .await
                    .with_context(|| format!("Failed to open capture {}", path.display()))?;
                self.start(feed, stop).await
            }
            None => {
                let feed_config = &self.config.logger.feed;
                let feed = TcpFeed::connect(&feed_config.host, feed_config.port, read_size)
                    .await
                    .with_context(|| {
                        format!("Failed to connect to feed at {}", feed_config.addr())
                    })?;
                self.start(feed, stop).await
            }
        }
    }

    async fn start<S, F>(self, feed: S, stop: F) -> Result<PipelineStats>
    where
        S: ChunkSource,
        F: Future<Output = ()>,
    {
        let dispatcher = DispatcherBuilder::new(self.config.logger.clone())
            .build()
            .await
            .context("Failed to initialise persistence backends")?;

        Ok(self.run_with_source(feed, dispatcher, stop).await)
    }

    /// Run over an already open source and dispatcher.
    pub async fn run_with_source<S, I, F>(
        mut self,
        source: S,
        dispatcher: Dispatcher<I>,
        stop: F,
    ) -> PipelineStats
    where
        S: ChunkSource,
        I: DataSink,
        F: Future<Output = ()>,
    {
        let mut session = Session::new(source, dispatcher);
        self.transition(PipelineState::Running);

        let pumped = AssertUnwindSafe(session.pump(
            stop,
            self.config.max_records,
            self.config.timeout,
        ))
        .catch_unwind()
        .await;

        let trigger = match pumped {
            Ok(trigger) => trigger,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(panic = %message, "Panic while running, draining pipeline");
                session.dispatcher.discard_immediate();
                DrainTrigger::Fault(format!("panic: {message}"))
            }
        };

        self.transition(PipelineState::Draining);
        let stats = session.drain(trigger).await;
        self.transition(PipelineState::Closed);

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            records = stats.records_parsed,
            "Pipeline shutdown complete"
        );
        stats
    }

    fn transition(&mut self, next: PipelineState) {
        debug!(from = %self.state, to = %next, "Pipeline state change");
        self.state = next;
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Resources owned while Running
struct Session<S, I> {
    lines: LineStream<S>,
    dispatcher: Dispatcher<I>,
    stats: PipelineStats,
    started: Instant,
}

impl<S, I> Session<S, I>
where
    S: ChunkSource,
    I: DataSink,
{
    fn new(source: S, dispatcher: Dispatcher<I>) -> Self {
        Self {
            lines: LineStream::new(source),
            dispatcher,
            stats: PipelineStats::default(),
            started: Instant::now(),
        }
    }

    /// Process lines until something moves the pipeline out of Running
    async fn pump<F>(
        &mut self,
        stop: F,
        max_records: Option<u64>,
        timeout: Option<Duration>,
    ) -> DrainTrigger
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(stop);
        let deadline = async move {
            match timeout {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);

        info!(origin = %self.lines.origin(), max_records = ?max_records, "Pipeline running");

        loop {
            let next = tokio::select! {
                biased;
                _ = &mut stop => {
                    warn!("Stop requested, draining pipeline");
                    return DrainTrigger::StopRequested;
                }
                _ = &mut deadline => {
                    warn!(timeout_secs = ?timeout.map(|t| t.as_secs()), "Pipeline timed out");
                    return DrainTrigger::Timeout;
                }
                next = self.lines.next_line() => next,
            };

            match next {
                Ok(Some(line)) => {
                    self.handle_line(&line).await;

                    if max_records.is_some_and(|max| self.stats.records_parsed >= max) {
                        info!(records = self.stats.records_parsed, "Reached max records limit");
                        return DrainTrigger::LimitReached;
                    }
                }
                Ok(None) => {
                    info!(origin = %self.lines.origin(), "Feed closed by remote");
                    return DrainTrigger::RemoteClosed;
                }
                Err(e) => {
                    error!(origin = %self.lines.origin(), error = %e, "Feed failed, draining pipeline");
                    return DrainTrigger::Fault(e.to_string());
                }
            }
        }
    }

    async fn handle_line(&mut self, raw: &str) {
        self.stats.lines_read += 1;

        match parse_line(raw.trim()) {
            ParseOutcome::Parsed(report) => {
                let observation = Observation::from_report(report);
                record_observation(&observation);
                self.stats.feed.update(&observation);
                self.stats.records_parsed += 1;

                let outcome = self.dispatcher.offer(&observation).await;
                if outcome.immediate == Some(false) || !outcome.batch {
                    self.stats.degraded_offers += 1;
                }

                if self.stats.records_parsed.is_multiple_of(100) {
                    debug!(
                        records = self.stats.records_parsed,
                        pending = self.dispatcher.pending_len(),
                        "Pipeline progress"
                    );
                }
            }
            ParseOutcome::Skipped(reason) => {
                trace!(reason = %reason, "Line skipped");
                record_line_skipped(reason.as_str());
                self.stats.feed.record_skip(reason.as_str());
            }
        }
    }

    /// Release the transport, close the immediate backend, flush once
    async fn drain(self, trigger: DrainTrigger) -> PipelineStats {
        let Self {
            lines,
            dispatcher,
            mut stats,
            started,
        } = self;

        info!(trigger = %trigger, "Draining pipeline");

        stats.ingestion = lines.metrics().snapshot();
        drop(lines);

        let report = dispatcher.drain().await;
        stats.absorb(report);
        stats.duration = started.elapsed();
        stats.trigger = Some(trigger);
        stats
    }
}
