use std::path::PathBuf;

/// Errors from the generation layer.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Generation API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// No credentials were supplied when building the backend.
    #[error("API Key is missing. Set GEMINI_API_KEY env var or pass it as an argument.")]
    MissingApiKey,

    /// Phase 1 could not produce a valid storyboard.
    #[error("Failed to interpret audio storyboard: {source}")]
    Analysis {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The image response carried neither raw bytes nor inline data.
    #[error("No image data in response")]
    NoImageData,

    /// Inline image data was not valid base64.
    #[error("Invalid inline image data: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Writing a generated image to disk failed.
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerationError {
    /// Wrap any failure raised while producing a storyboard.
    pub fn analysis(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Analysis {
            source: source.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
