use std::path::PathBuf;

use dreamer_core::error::CoreError;
use dreamer_genai::GenerationError;

/// Fatal errors that abort a pipeline command.
///
/// Per-item image failures never surface here; they are collected in a
/// [`PhaseReport`](crate::report::PhaseReport) instead.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// An input file does not exist.
    #[error("File {} not found.", path.display())]
    NotFound { path: PathBuf },

    /// The input was rejected before any work started.
    #[error(transparent)]
    Input(#[from] CoreError),

    /// Phase 1 produced no usable storyboard.
    #[error(transparent)]
    Analysis(#[from] GenerationError),

    /// Reading an input or checkpoint failed.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Recording progress on disk failed.
    #[error("Failed to write {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A storyboard document could not be encoded or decoded.
    #[error("Invalid storyboard document {}: {source}", path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Resume found neither checkpoint file in the output directory.
    #[error("No storyboard checkpoint found in {}", dir.display())]
    MissingCheckpoint { dir: PathBuf },
}

impl PipelineError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn document(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Document {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use dreamer_core::audio::audio_mime_type;

    use super::*;

    #[test]
    fn not_found_names_the_file() {
        let err = PipelineError::NotFound {
            path: PathBuf::from("nonexistent.mp3"),
        };
        assert_eq!(err.to_string(), "File nonexistent.mp3 not found.");
    }

    #[test]
    fn unsupported_format_message_passes_through() {
        let core = audio_mime_type(Path::new("test.txt")).unwrap_err();
        let err = PipelineError::from(core);
        assert_eq!(err.to_string(), "Unsupported audio format: .txt");
    }

    #[test]
    fn persistence_error_keeps_source() {
        let err = PipelineError::persistence(
            "out/storyboard.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().starts_with("Failed to write out/storyboard.json"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
