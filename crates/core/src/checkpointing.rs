//! Output directory layout for checkpoints and generated images.
//!
//! This module lives in `core` (zero internal deps) so the pipeline and the
//! CLI agree on where every artifact of a run is written.

use std::path::{Path, PathBuf};

use crate::naming::{element_image_filename, scene_image_filename};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default output directory for a run.
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Checkpoint written after Phase 1 and refreshed after Phase 2.
pub const CHECKPOINT_FILE: &str = "storyboard.json";

/// Final document written after Phase 3.
pub const FINAL_FILE: &str = "storyboard_final.json";

/// Subdirectory for element reference images.
pub const ELEMENTS_DIR: &str = "elements";

/// Subdirectory for scene renders.
pub const SCENES_DIR: &str = "scenes";

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Well-known paths under one output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.root.join(CHECKPOINT_FILE)
    }

    pub fn final_path(&self) -> PathBuf {
        self.root.join(FINAL_FILE)
    }

    pub fn elements_dir(&self) -> PathBuf {
        self.root.join(ELEMENTS_DIR)
    }

    pub fn scenes_dir(&self) -> PathBuf {
        self.root.join(SCENES_DIR)
    }

    /// `<root>/elements/<key>.png`
    pub fn element_image_path(&self, key: &str) -> PathBuf {
        self.elements_dir().join(element_image_filename(key))
    }

    /// `<root>/scenes/scene_<index>_<timestamp>s.png`
    pub fn scene_image_path(&self, index: usize, timestamp: f64) -> PathBuf {
        self.scenes_dir().join(scene_image_filename(index, timestamp))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
