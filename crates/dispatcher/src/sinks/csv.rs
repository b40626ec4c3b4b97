//! CsvBatchSink - buffers observations and appends them to a CSV file in batches

use contracts::{ContractError, CsvConfig, DataSink, Observation};
use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};

/// Column order of the CSV output
pub const CSV_HEADER: [&str; 8] = [
    "time",
    "icao",
    "callsign",
    "altitude",
    "lat",
    "lon",
    "speed",
    "classification",
];

/// Sink that accumulates observations and appends them as one batch.
///
/// A batch is serialized fully in memory and appended in one write. If the
/// write or sync fails, the file is truncated back to its length before the
/// append. Failed batches stay pending and are retried by the next flush.
pub struct CsvBatchSink {
    name: String,
    path: PathBuf,
    batch_size: usize,
    pending: Vec<Observation>,
    rows_written: u64,
    flushes: u64,
    failed_flushes: u64,
}

impl CsvBatchSink {
    /// Create a new CsvBatchSink. The file is not touched until the first flush.
    pub fn new(name: impl Into<String>, config: &CsvConfig) -> Self {
        Self {
            name: name.into(),
            path: config.path.clone(),
            batch_size: config.batch_size.max(1),
            pending: Vec::with_capacity(config.batch_size),
            rows_written: 0,
            flushes: 0,
            failed_flushes: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Observations accepted but not yet persisted
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Rows appended to the file by this sink instance
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Non-empty batches appended successfully
    pub fn flushes(&self) -> u64 {
        self.flushes
    }

    /// Flush attempts that failed, threshold and explicit alike
    pub fn failed_flushes(&self) -> u64 {
        self.failed_flushes
    }

    /// Append every pending observation to the file.
    ///
    /// Returns the number of rows written. On failure the pending buffer is
    /// left exactly as it was.
    pub fn flush_pending(&mut self) -> Result<usize, ContractError> {
        if self.pending.is_empty() {
            return Ok(0);
        }

        let rows = self.pending.len();
        let result = self.append_batch();
        observability::record_batch_flush(&self.name, rows, result.is_ok());

        match result {
            Ok(()) => {
                self.pending.clear();
                self.rows_written += rows as u64;
                self.flushes += 1;
                debug!(sink = %self.name, rows, path = %self.path.display(), "Batch appended");
                Ok(rows)
            }
            Err(e) => {
                self.failed_flushes += 1;
                error!(
                    sink = %self.name,
                    retained = rows,
                    error = %e,
                    "Batch flush failed, observations retained"
                );
                Err(ContractError::sink_write(
                    &self.name,
                    format!("flush of {rows} observations failed: {e}"),
                ))
            }
        }
    }

    fn append_batch(&self) -> io::Result<()> {
        let with_header = needs_header(&self.path)?;
        let payload = self.render(with_header)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        append_or_rollback(&mut file, |file| {
            file.write_all(&payload)?;
            file.sync_data()
        })
    }

    fn render(&self, with_header: bool) -> std::io::Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        if with_header {
            writer.write_record(CSV_HEADER)?;
        }
        for observation in &self.pending {
            writer.serialize(observation)?;
        }

        writer
            .into_inner()
            .map_err(|e| std::io::Error::other(e.to_string()))
    }
}

/// Run `append` against `file`; on error, cut the file back to its prior length
fn append_or_rollback<F>(file: &mut File, append: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let start = file.metadata()?.len();
    let result = append(file);

    if result.is_err() {
        if let Err(e) = file.set_len(start).and_then(|()| file.sync_data()) {
            warn!(error = %e, len = start, "Could not truncate partial batch");
        }
    }
    result
}

/// Header goes in only when the file is absent or empty
fn needs_header(path: &Path) -> std::io::Result<bool> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(meta.len() == 0),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
        Err(e) => Err(e),
    }
}

impl DataSink for CsvBatchSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "csv_sink_write",
        skip(self, observation),
        fields(sink = %self.name, icao = observation.icao())
    )]
    async fn write(&mut self, observation: &Observation) -> Result<(), ContractError> {
        self.pending.push(observation.clone());
        observability::record_pending_batch(&self.name, self.pending.len());

        // A failed threshold flush keeps the observation pending and is
        // counted in `failed_flushes`; the write itself succeeded.
        if self.pending.len() >= self.batch_size {
            let _ = self.flush_pending();
        }
        Ok(())
    }

    #[instrument(name = "csv_sink_flush", skip(self), fields(sink = %self.name))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        self.flush_pending().map(|_| ())
    }

    #[instrument(name = "csv_sink_close", skip(self), fields(sink = %self.name))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(
            sink = %self.name,
            rows_written = self.rows_written,
            unflushed = self.pending.len(),
            "CsvBatchSink closed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::observation;
    use tempfile::tempdir;

    fn config(path: PathBuf, batch_size: usize) -> CsvConfig {
        CsvConfig { path, batch_size }
    }

    fn read_lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_flush_at_threshold() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut sink = CsvBatchSink::new("csv", &config(path.clone(), 3));

        for i in 0..3 {
            sink.write(&observation(&format!("A{i}"), Some(1000.0), Some(100.0)))
                .await
                .unwrap();
        }

        assert_eq!(sink.pending_len(), 0);
        assert_eq!(sink.rows_written(), 3);
        let lines = read_lines(&path);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "time,icao,callsign,altitude,lat,lon,speed,classification");
        assert_eq!(
            lines[1],
            "2024-05-01 12:00:00,A0,CSA0,1000.0,53.35,-6.26,100.0,Helicopter"
        );
    }

    #[tokio::test]
    async fn test_below_threshold_stays_pending() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut sink = CsvBatchSink::new("csv", &config(path.clone(), 2));

        for i in 0..3 {
            sink.write(&observation(&format!("B{i}"), None, None))
                .await
                .unwrap();
        }

        assert_eq!(sink.pending_len(), 1);
        assert_eq!(read_lines(&path).len(), 3);

        sink.flush().await.unwrap();
        assert_eq!(sink.pending_len(), 0);
        let lines = read_lines(&path);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3], "2024-05-01 12:00:00,B2,CSB2,,53.35,-6.26,,Unknown");
    }

    #[tokio::test]
    async fn test_failed_flush_retains_and_retries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let mut sink = CsvBatchSink::new("csv", &config(path.clone(), 2));

        sink.write(&observation("C0", None, Some(5.0))).await.unwrap();
        sink.write(&observation("C1", None, Some(5.0))).await.unwrap();
        assert_eq!(sink.pending_len(), 2);
        assert_eq!(sink.rows_written(), 0);
        assert_eq!(sink.failed_flushes(), 1);
        assert!(sink.flush().await.is_err());
        assert_eq!(sink.failed_flushes(), 2);

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        sink.flush().await.unwrap();

        assert_eq!(sink.pending_len(), 0);
        assert_eq!(sink.flushes(), 1);
        let lines = read_lines(&path);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("C0"));
        assert!(lines[2].contains("C1"));
    }

    #[tokio::test]
    async fn test_header_written_once_across_sessions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        for session in 0..2 {
            let mut sink = CsvBatchSink::new("csv", &config(path.clone(), 10));
            sink.write(&observation(&format!("S{session}"), Some(30.0), Some(20.0)))
                .await
                .unwrap();
            sink.flush().await.unwrap();
            sink.close().await.unwrap();
        }

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.iter().filter(|l| l.starts_with("time,")).count(), 1);
        assert!(lines[2].ends_with("Ground"));
    }

    #[tokio::test]
    async fn test_header_added_to_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::File::create(&path).unwrap();

        let mut sink = CsvBatchSink::new("csv", &config(path.clone(), 1));
        sink.write(&observation("E0", None, None)).await.unwrap();

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("time,"));
    }

    #[tokio::test]
    async fn test_empty_flush_does_not_create_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut sink = CsvBatchSink::new("csv", &config(path.clone(), 5));

        sink.flush().await.unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_append_truncates_partial_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "time,icao\n").unwrap();

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        let result = append_or_rollback(&mut file, |file| {
            file.write_all(b"2024-05-01 12:00:00,PART")?;
            Err(io::Error::other("disk full"))
        });
        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "time,icao\n");

        append_or_rollback(&mut file, |file| file.write_all(b"2024-05-01 12:00:00,FULL\n"))
            .unwrap();
        assert_eq!(
            read_lines(&path),
            vec!["time,icao", "2024-05-01 12:00:00,FULL"]
        );
    }
}
