//! Pipeline statistics and metrics.

use std::time::Duration;

use dispatcher::DrainReport;
use observability::FeedMetricsAggregator;

use super::DrainTrigger;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Complete lines pulled from the feed
    pub lines_read: u64,

    /// Lines that became observations
    pub records_parsed: u64,

    /// Observations that at least one backend failed to accept
    pub degraded_offers: u64,

    /// Classification histogram, skip reasons, value statistics
    pub feed: FeedMetricsAggregator,

    /// Transport-level counters
    pub ingestion: ingestion::MetricsSnapshot,

    /// Final counters per sink
    pub sinks: Vec<(String, dispatcher::MetricsSnapshot)>,

    /// Rows written by the final flush
    pub final_flush_rows: usize,

    /// Observations lost because the final flush failed
    pub unflushed: usize,

    /// Rows appended to the CSV file during the run
    pub csv_rows_written: u64,

    /// Failed CSV flush attempts, threshold and final
    pub csv_flush_failures: u64,

    /// Total duration of the Running phase plus drain
    pub duration: Duration,

    /// What ended the run
    pub trigger: Option<DrainTrigger>,
}

impl PipelineStats {
    /// Fold the dispatcher's drain report into the run stats
    pub fn absorb(&mut self, report: DrainReport) {
        self.sinks = report.sinks;
        self.final_flush_rows = report.final_flush_rows;
        self.unflushed = report.unflushed;
        self.csv_rows_written = report.csv_rows_written;
        self.csv_flush_failures = report.csv_flush_failures;
    }

    /// Calculate records per second throughput
    pub fn records_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.records_parsed as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Pipeline Statistics ===\n");

        println!("Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Lines read: {}", self.lines_read);
        println!("   ├─ Records parsed: {}", self.records_parsed);
        println!("   ├─ Records/s: {:.2}", self.records_per_sec());
        println!("   ├─ Bytes received: {}", self.ingestion.bytes_received);
        if let Some(trigger) = &self.trigger {
            println!("   └─ Ended by: {}", trigger);
        }

        let summary = self.feed.summary();

        if !summary.classification_counts.is_empty() {
            println!("\nClassifications");
            for (label, count) in &summary.classification_counts {
                println!("   ├─ {}: {}", label, count);
            }
        }

        if !summary.skip_counts.is_empty() {
            println!("\nSkipped lines ({})", summary.total_skipped);
            for (reason, count) in &summary.skip_counts {
                println!("   ├─ {}: {}", reason, count);
            }
        }

        println!("\nSinks");
        for (name, snapshot) in &self.sinks {
            println!(
                "   ├─ {}: {} written, {} failed, {} flushes ({} failed)",
                name,
                snapshot.write_count,
                snapshot.failure_count,
                snapshot.flush_count,
                snapshot.flush_failure_count
            );
        }
        println!("   ├─ CSV rows appended: {}", self.csv_rows_written);
        println!("   ├─ CSV flush failures: {}", self.csv_flush_failures);
        println!("   └─ Final flush rows: {}", self.final_flush_rows);

        if self.unflushed > 0 {
            println!(
                "\n!! {} observations were not written to CSV",
                self.unflushed
            );
        }

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_per_sec() {
        let stats = PipelineStats {
            records_parsed: 50,
            duration: Duration::from_secs(10),
            ..Default::default()
        };
        assert!((stats.records_per_sec() - 5.0).abs() < f64::EPSILON);
        assert_eq!(PipelineStats::default().records_per_sec(), 0.0);
    }

    #[test]
    fn test_absorb_drain_report() {
        let mut stats = PipelineStats::default();
        stats.absorb(DrainReport {
            sinks: vec![("csv".into(), Default::default())],
            final_flush_rows: 3,
            unflushed: 1,
            csv_rows_written: 12,
            csv_flush_failures: 2,
        });
        assert_eq!(stats.sinks.len(), 1);
        assert_eq!(stats.final_flush_rows, 3);
        assert_eq!(stats.unflushed, 1);
        assert_eq!(stats.csv_rows_written, 12);
        assert_eq!(stats.csv_flush_failures, 2);
    }
}
