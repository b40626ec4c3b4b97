//! DataSink trait - Dispatcher output interface
//!
//! Defines the abstract interface for persistence backends.

use crate::{ContractError, Observation};

/// Data output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(DataSink: Send)]
pub trait LocalDataSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Accept one observation
    ///
    /// # Errors
    /// Returns write error (should include context). A failed write must
    /// leave the sink usable for the next observation.
    async fn write(&mut self, observation: &Observation) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink and release its handles
    async fn close(&mut self) -> Result<(), ContractError>;
}
