//! LogSink - echoes each observation through tracing

use contracts::{ContractError, DataSink, Observation};
use tracing::{info, instrument};

/// Sink that prints one console line per observation
pub struct LogSink {
    name: String,
    echoed: u64,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            echoed: 0,
        }
    }

    pub fn echoed(&self) -> u64 {
        self.echoed
    }
}

impl DataSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, observation: &Observation) -> Result<(), ContractError> {
        info!(
            icao = observation.icao(),
            callsign = observation.callsign(),
            altitude = ?observation.altitude(),
            speed = ?observation.speed(),
            lat = ?observation.lat(),
            lon = ?observation.lon(),
            classification = %observation.classification(),
            "{}", observation.timestamp()
        );
        self.echoed += 1;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, echoed = self.echoed, "LogSink closed");
        Ok(())
    }
}
