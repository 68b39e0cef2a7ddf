//! High-level generation client.
//!
//! [`GenerationClient`] wraps a [`GenerationBackend`] and exposes the two
//! operations the pipeline needs: turning audio into a [`Storyboard`] and
//! rendering one image to disk. It negotiates request formats and
//! normalizes the different response shapes; it never retries.

use std::path::{Path, PathBuf};

use dreamer_core::config::{AnalysisConfig, ImageGenerationConfig};
use dreamer_core::storyboard::Storyboard;
use tokio::io::AsyncWriteExt;

use crate::backend::GenerationBackend;
use crate::error::GenerationError;
use crate::messages::{Content, GenerateContentRequest, GenerationConfig, Part};
use crate::schema::storyboard_response_schema;

/// MIME type attached to every reference image part.
pub const REFERENCE_IMAGE_MIME: &str = "image/png";

/// Suffix of the temporary file an image is written to before renaming.
const PARTIAL_SUFFIX: &str = ".part";

/// Capability object built once and borrowed by the orchestrator.
pub struct GenerationClient<B> {
    backend: B,
}

impl<B: GenerationBackend> GenerationClient<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Ask the backend to infer a storyboard from raw audio.
    ///
    /// Accepts either a pre-parsed structured result or raw JSON text. Any
    /// failure (backend error, empty response, schema mismatch) is reported
    /// as [`GenerationError::Analysis`]. The returned storyboard always has
    /// its scenes sorted by timestamp.
    pub async fn analyze(
        &self,
        audio: &[u8],
        mime_type: &str,
        prompt: &str,
        config: &AnalysisConfig,
    ) -> Result<Storyboard, GenerationError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::inline(mime_type, audio), Part::text(prompt)],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(storyboard_response_schema()),
                temperature: Some(config.temperature()),
                ..GenerationConfig::default()
            }),
        };

        tracing::info!(
            model = config.model(),
            mime_type,
            audio_bytes = audio.len(),
            "Requesting storyboard analysis",
        );

        let response = self
            .backend
            .generate_content(config.model(), &request)
            .await
            .map_err(GenerationError::analysis)?;

        let storyboard = response.storyboard()?;
        tracing::info!(
            title = %storyboard.title,
            elements = storyboard.elements().len(),
            scenes = storyboard.scenes().len(),
            "Storyboard received",
        );
        Ok(storyboard)
    }

    /// Render one image and write it to `output_path`.
    ///
    /// Sends every reference buffer as an inline image part followed by the
    /// prompt. Makes exactly one backend call. Parent directories are
    /// created as needed and the file is fully flushed before the path is
    /// returned.
    pub async fn generate_image(
        &self,
        prompt: &str,
        reference_images: &[Vec<u8>],
        config: &ImageGenerationConfig,
        output_path: &Path,
    ) -> Result<PathBuf, GenerationError> {
        let mut parts: Vec<Part> = reference_images
            .iter()
            .map(|bytes| Part::inline(REFERENCE_IMAGE_MIME, bytes))
            .collect();
        parts.push(Part::text(prompt));

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["IMAGE".to_string()]),
                ..GenerationConfig::default()
            }),
        };

        let response = self
            .backend
            .generate_content(config.model(), &request)
            .await?;
        let bytes = response.into_image_bytes()?;

        write_image(&bytes, output_path).await?;
        tracing::debug!(
            path = %output_path.display(),
            bytes = bytes.len(),
            references = reference_images.len(),
            "Image saved",
        );
        Ok(output_path.to_path_buf())
    }
}

/// Write `bytes` next to `path`, flush, then rename into place so a
/// half-written file never appears under the final name.
async fn write_image(bytes: &[u8], path: &Path) -> Result<(), GenerationError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| GenerationError::io(parent, e))?;
    }

    let mut partial = path.as_os_str().to_owned();
    partial.push(PARTIAL_SUFFIX);
    let partial = PathBuf::from(partial);

    if let Err(e) = write_partial(bytes, &partial).await {
        tokio::fs::remove_file(&partial).await.ok();
        return Err(GenerationError::io(&partial, e));
    }

    if let Err(e) = tokio::fs::rename(&partial, path).await {
        tokio::fs::remove_file(&partial).await.ok();
        return Err(GenerationError::io(path, e));
    }
    Ok(())
}

async fn write_partial(bytes: &[u8], partial: &Path) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(partial).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await
}
