//! The classification pipeline module.
//!
//! This module provides the orchestrator that combines the image source,
//! decoder, and model into one observable state machine, plus the state and
//! statistics types it publishes.

mod orchestrator;
mod state;
mod stats;

pub use orchestrator::{ClassificationPipeline, ClassificationPipelineBuilder};
pub use state::{ClassifyOutcome, PipelineState, RequestOutcome};
pub use stats::{PipelineStats, StatsSnapshot};
