//! Per-phase outcome summaries.
//!
//! Failed items are recorded here rather than raised so the caller can
//! report them as warnings while the run still completes.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// The element or scene an outcome refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailedItem {
    Element { name: String },
    Scene { index: usize },
}

impl fmt::Display for FailedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element { name } => write!(f, "element '{name}'"),
            Self::Scene { index } => write!(f, "scene {index}"),
        }
    }
}

/// One item that still had no image after its retries ran out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub item: FailedItem,
    pub error: String,
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to generate {}: {}", self.item, self.error)
    }
}

/// Outcome of one image phase. Paths are the files on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PhaseReport {
    pub generated: Vec<PathBuf>,
    pub reused: Vec<PathBuf>,
    pub failed: Vec<ItemFailure>,
}

impl PhaseReport {
    /// Items that ended the phase with an image.
    pub fn completed(&self) -> usize {
        self.generated.len() + self.reused.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Outcome of Phases 2 and 3 together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub elements: PhaseReport,
    pub scenes: PhaseReport,
    pub checkpoint_path: PathBuf,
    pub final_path: PathBuf,
}

impl RunReport {
    pub fn failures(&self) -> impl Iterator<Item = &ItemFailure> {
        self.elements.failed.iter().chain(self.scenes.failed.iter())
    }

    pub fn has_failures(&self) -> bool {
        !(self.elements.is_clean() && self.scenes.is_clean())
    }
}
