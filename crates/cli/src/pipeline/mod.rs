//! Pipeline orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{DrainTrigger, Pipeline, PipelineConfig, PipelineState};
pub use stats::PipelineStats;
