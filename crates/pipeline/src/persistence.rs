//! Storyboard checkpoint documents on disk.
//!
//! Documents are pretty-printed JSON written to a sibling temporary file
//! and renamed into place, so readers only ever see a complete document.

use std::path::{Path, PathBuf};

use dreamer_core::checkpointing::OutputLayout;
use dreamer_core::storyboard::Storyboard;
use tokio::io::AsyncWriteExt;

use crate::error::PipelineError;

/// Extension of the temporary file used while writing a document.
const TEMP_EXTENSION: &str = "json.tmp";

/// Reads and writes the checkpoint files of one output directory.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    layout: OutputLayout,
}

impl CheckpointStore {
    pub fn new(layout: OutputLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Write `storyboard.json`.
    pub async fn save_checkpoint(&self, storyboard: &Storyboard) -> Result<PathBuf, PipelineError> {
        let path = self.layout.checkpoint_path();
        save(&path, storyboard).await?;
        Ok(path)
    }

    /// Write `storyboard_final.json`.
    pub async fn save_final(&self, storyboard: &Storyboard) -> Result<PathBuf, PipelineError> {
        let path = self.layout.final_path();
        save(&path, storyboard).await?;
        Ok(path)
    }

    /// Load the document a resumed run continues from: the checkpoint if
    /// present, otherwise the final document.
    pub async fn load_for_resume(&self) -> Result<(Storyboard, PathBuf), PipelineError> {
        for path in [self.layout.checkpoint_path(), self.layout.final_path()] {
            if tokio::fs::try_exists(&path)
                .await
                .map_err(|e| PipelineError::read(&path, e))?
            {
                let storyboard = load(&path).await?;
                return Ok((storyboard, path));
            }
        }
        Err(PipelineError::MissingCheckpoint {
            dir: self.layout.root().to_path_buf(),
        })
    }
}

/// Read a storyboard document from `path`.
pub async fn load(path: &Path) -> Result<Storyboard, PipelineError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PipelineError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(PipelineError::read(path, e)),
    };
    let storyboard: Storyboard =
        serde_json::from_slice(&bytes).map_err(|e| PipelineError::document(path, e))?;

    tracing::debug!(
        path = %path.display(),
        scenes = storyboard.scenes().len(),
        "Storyboard loaded",
    );
    Ok(storyboard)
}

/// Write `storyboard` to `path`, creating parent directories as needed.
pub async fn save(path: &Path, storyboard: &Storyboard) -> Result<(), PipelineError> {
    let json =
        serde_json::to_vec_pretty(storyboard).map_err(|e| PipelineError::document(path, e))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| PipelineError::persistence(parent, e))?;
    }

    let temp = path.with_extension(TEMP_EXTENSION);
    let mut file = tokio::fs::File::create(&temp)
        .await
        .map_err(|e| PipelineError::persistence(&temp, e))?;
    file.write_all(&json)
        .await
        .map_err(|e| PipelineError::persistence(&temp, e))?;
    file.sync_all()
        .await
        .map_err(|e| PipelineError::persistence(&temp, e))?;
    drop(file);

    tokio::fs::rename(&temp, path)
        .await
        .map_err(|e| PipelineError::persistence(path, e))?;

    tracing::info!(path = %path.display(), "Storyboard saved");
    Ok(())
}
