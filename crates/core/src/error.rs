#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    /// `extension` carries the leading dot (e.g. `.txt`), or `(none)`.
    #[error("Unsupported audio format: {extension}")]
    UnsupportedAudioFormat { extension: String },
}
