//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the logger.
//! Business crates depend on this crate only, never on each other's internals.
//!
//! ## Time Model
//! - Observations carry the capture-local wall clock at parse time
//! - Timestamps are rendered as `%Y-%m-%d %H:%M:%S` in both sinks

mod classification;
mod config;
mod error;
mod observation;
mod sink;

pub use classification::*;
pub use config::*;
pub use error::*;
pub use observation::*;
pub use sink::*;
