//! Core engine: algorithm dispatch and the per-league pipeline.

pub mod dispatch;
pub mod pipeline;

pub use dispatch::{run_algorithm, AlgorithmSettings};
pub use pipeline::{MatchBatch, Pipeline, PipelineOutput};
