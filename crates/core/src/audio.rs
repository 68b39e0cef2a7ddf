//! Recognized audio input formats and MIME negotiation.

use std::path::Path;

use crate::error::CoreError;

/// Extension (lowercase, no dot) to MIME type for every accepted input.
pub const AUDIO_FORMATS: &[(&str, &str)] = &[
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("m4a", "audio/mp4"),
    ("aac", "audio/aac"),
    ("flac", "audio/flac"),
    ("ogg", "audio/ogg"),
];

/// Map a file path to the MIME type sent alongside its bytes.
///
/// Matching is case-insensitive on the extension. Anything outside
/// [`AUDIO_FORMATS`] fails with [`CoreError::UnsupportedAudioFormat`].
pub fn audio_mime_type(path: &Path) -> Result<&'static str, CoreError> {
    let extension = path.extension().and_then(|e| e.to_str());
    let Some(extension) = extension else {
        return Err(CoreError::UnsupportedAudioFormat {
            extension: "(none)".to_string(),
        });
    };

    let lower = extension.to_ascii_lowercase();
    AUDIO_FORMATS
        .iter()
        .find(|(ext, _)| *ext == lower)
        .map(|(_, mime)| *mime)
        .ok_or_else(|| CoreError::UnsupportedAudioFormat {
            extension: format!(".{extension}"),
        })
}
