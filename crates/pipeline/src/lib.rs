//! Three-phase production pipeline.
//!
//! Sequences audio analysis, element reference rendering and scene
//! rendering over a [`GenerationClient`](dreamer_genai::GenerationClient),
//! persists the storyboard at each checkpoint, and isolates per-item
//! failures so one bad element or scene never aborts a batch.

pub mod error;
pub mod orchestrator;
pub mod persistence;
pub mod report;

pub use error::PipelineError;
pub use orchestrator::{DesignOutcome, Pipeline};
pub use persistence::CheckpointStore;
pub use report::{FailedItem, ItemFailure, PhaseReport, RunReport};
