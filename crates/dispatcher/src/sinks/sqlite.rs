//! SqliteSink - inserts every observation into a local SQLite table

use contracts::{ContractError, DataSink, Observation, SqliteConfig};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS adsb (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ts TEXT,
    icao TEXT,
    callsign TEXT,
    altitude REAL,
    lat REAL,
    lon REAL,
    speed REAL,
    classification TEXT
)
"#;

const INSERT_OBSERVATION: &str = r#"
INSERT INTO adsb (ts, icao, callsign, altitude, lat, lon, speed, classification)
VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#;

/// Sink that commits one row per observation.
///
/// Uses a single-connection pool, so inserts are applied in arrival order.
pub struct SqliteSink {
    name: String,
    path: PathBuf,
    pool: Option<SqlitePool>,
}

impl SqliteSink {
    /// Open (or create) the database and make sure the `adsb` table exists
    #[instrument(name = "sqlite_sink_open", skip(name, config), fields(path = %config.path.display()))]
    pub async fn open(
        name: impl Into<String>,
        config: &SqliteConfig,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| ContractError::sink_connection(&name, e.to_string()))?;

        sqlx::query(CREATE_TABLE)
            .execute(&pool)
            .await
            .map_err(|e| ContractError::sink_connection(&name, e.to_string()))?;

        info!(sink = %name, path = %config.path.display(), "SQLite database ready");

        Ok(Self {
            name,
            path: config.path.clone(),
            pool: Some(pool),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Connection pool, `None` once closed
    pub fn pool(&self) -> Option<&SqlitePool> {
        self.pool.as_ref()
    }

    /// Number of rows currently in the `adsb` table
    pub async fn row_count(&self) -> Result<i64, ContractError> {
        let pool = self.live_pool()?;
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM adsb")
            .fetch_one(pool)
            .await
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    fn live_pool(&self) -> Result<&SqlitePool, ContractError> {
        self.pool
            .as_ref()
            .ok_or_else(|| ContractError::sink_write(&self.name, "database already closed"))
    }
}

impl DataSink for SqliteSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "sqlite_sink_write",
        skip(self, observation),
        fields(sink = %self.name, icao = observation.icao())
    )]
    async fn write(&mut self, observation: &Observation) -> Result<(), ContractError> {
        let pool = self.live_pool()?;
        let result = sqlx::query(INSERT_OBSERVATION)
            .bind(observation.timestamp())
            .bind(observation.icao())
            .bind(observation.callsign())
            .bind(observation.altitude())
            .bind(observation.lat())
            .bind(observation.lon())
            .bind(observation.speed())
            .bind(observation.classification().as_str())
            .execute(pool)
            .await
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;

        debug!(sink = %self.name, row_id = result.last_insert_rowid(), "Row committed");
        Ok(())
    }

    #[instrument(name = "sqlite_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Every insert is already committed
        Ok(())
    }

    #[instrument(name = "sqlite_sink_close", skip(self), fields(sink = %self.name))]
    async fn close(&mut self) -> Result<(), ContractError> {
        if let Some(pool) = self.pool.take() {
            pool.close().await;
            info!(sink = %self.name, "SqliteSink closed");
        }
        Ok(())
    }
}
