//! Phase sequencing with checkpointing and per-item failure isolation.
//!
//! Phase 1 failures are fatal. In Phases 2 and 3 each element or scene is
//! attempted under the [`RetryPolicy`]; an item that still fails is logged,
//! recorded in the [`PhaseReport`] and left without an `image_url` so a
//! later resume picks it up. Existing output files are reused without
//! calling the backend.

use std::path::{Path, PathBuf};

use dreamer_core::audio::audio_mime_type;
use dreamer_core::checkpointing::OutputLayout;
use dreamer_core::config::{AnalysisConfig, ImageGenerationConfig};
use dreamer_core::naming::element_keys;
use dreamer_core::prompts::{element_prompt, scene_prompt};
use dreamer_core::storyboard::Storyboard;
use dreamer_genai::{GenerationBackend, GenerationClient, RetryPolicy};

use crate::error::PipelineError;
use crate::persistence::CheckpointStore;
use crate::report::{FailedItem, ItemFailure, PhaseReport, RunReport};

/// Result of Phase 2.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignOutcome {
    pub report: PhaseReport,
    /// Element images available to Phase 3, in element order.
    pub references: Vec<PathBuf>,
    pub checkpoint_path: PathBuf,
}

/// Runs the phases for one output directory.
pub struct Pipeline<'a, B> {
    client: &'a GenerationClient<B>,
    analysis: AnalysisConfig,
    image: ImageGenerationConfig,
    policy: RetryPolicy,
    store: CheckpointStore,
}

impl<'a, B: GenerationBackend> Pipeline<'a, B> {
    /// Build a pipeline writing under `output_dir`. The retry policy is
    /// derived from `image`.
    pub fn new(
        client: &'a GenerationClient<B>,
        analysis: AnalysisConfig,
        image: ImageGenerationConfig,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        let policy = RetryPolicy::from_config(&image);
        Self {
            client,
            analysis,
            image,
            policy,
            store: CheckpointStore::new(OutputLayout::new(output_dir)),
        }
    }

    /// Replace the retry policy (tests use one without waits).
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn layout(&self) -> &OutputLayout {
        self.store.layout()
    }

    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Phase 1
    // -----------------------------------------------------------------------

    /// Analyze `audio_path` into a storyboard and write the checkpoint.
    ///
    /// The file and its extension are validated before anything touches the
    /// output directory.
    pub async fn analyze(&self, audio_path: &Path, prompt: &str) -> Result<Storyboard, PipelineError> {
        if !audio_path.is_file() {
            return Err(PipelineError::NotFound {
                path: audio_path.to_path_buf(),
            });
        }
        let mime_type = audio_mime_type(audio_path)?;
        let audio = tokio::fs::read(audio_path)
            .await
            .map_err(|e| PipelineError::read(audio_path, e))?;

        tracing::info!(
            audio = %audio_path.display(),
            mime_type,
            "Phase 1: analyzing audio",
        );

        let storyboard = self
            .client
            .analyze(&audio, mime_type, prompt, &self.analysis)
            .await?;

        self.store.save_checkpoint(&storyboard).await?;
        Ok(storyboard)
    }

    // -----------------------------------------------------------------------
    // Phase 2
    // -----------------------------------------------------------------------

    /// Render a reference image for every recurring element, then refresh
    /// the checkpoint.
    pub async fn design_elements(
        &self,
        storyboard: &mut Storyboard,
    ) -> Result<DesignOutcome, PipelineError> {
        let names: Vec<String> = storyboard.elements().iter().map(|e| e.name.clone()).collect();
        let keys = element_keys(&names);
        let mut report = PhaseReport::default();
        let mut references = Vec::with_capacity(keys.len());

        tracing::info!(elements = keys.len(), "Phase 2: designing elements");

        for (index, key) in keys.iter().enumerate() {
            let path = self.layout().element_image_path(key);
            let element = &storyboard.elements()[index];

            if let Some(existing) = reusable_element_image(&path, element.image_url.as_deref()) {
                tracing::info!(
                    element = %element.name,
                    path = %existing.display(),
                    "Reusing existing element image",
                );
                storyboard.elements_mut()[index].image_url = Some(path_string(&existing));
                report.reused.push(existing.clone());
                references.push(existing);
                continue;
            }

            let name = element.name.clone();
            let prompt = element_prompt(storyboard.art_style(), element);
            match self.render(&format!("element {name}"), &prompt, &[], &path).await {
                Ok(saved) => {
                    storyboard.elements_mut()[index].image_url = Some(path_string(&saved));
                    report.generated.push(saved.clone());
                    references.push(saved);
                }
                Err(error) => {
                    tracing::warn!(element = %name, error = %error, "Failed to generate element");
                    storyboard.elements_mut()[index].image_url = None;
                    report.failed.push(ItemFailure {
                        item: FailedItem::Element { name },
                        error,
                    });
                }
            }
        }

        let checkpoint_path = self.store.save_checkpoint(storyboard).await?;
        tracing::info!(
            generated = report.generated.len(),
            reused = report.reused.len(),
            failed = report.failed.len(),
            "Phase 2 complete",
        );
        Ok(DesignOutcome {
            report,
            references,
            checkpoint_path,
        })
    }

    /// Element images already on disk, for rendering scenes without
    /// re-running Phase 2.
    pub fn collect_reference_paths(&self, storyboard: &Storyboard) -> Vec<PathBuf> {
        let names: Vec<&str> = storyboard.elements().iter().map(|e| e.name.as_str()).collect();
        element_keys(&names)
            .iter()
            .zip(storyboard.elements())
            .filter_map(|(key, element)| {
                let path = self.layout().element_image_path(key);
                reusable_element_image(&path, element.image_url.as_deref())
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Phase 3
    // -----------------------------------------------------------------------

    /// Render every scene in timestamp order with `references` attached,
    /// then write the final document.
    pub async fn render_scenes(
        &self,
        storyboard: &mut Storyboard,
        references: &[PathBuf],
    ) -> Result<(PhaseReport, PathBuf), PipelineError> {
        let reference_images = load_references(references).await;
        let mut report = PhaseReport::default();

        tracing::info!(
            scenes = storyboard.scenes().len(),
            references = reference_images.len(),
            "Phase 3: rendering scenes",
        );

        for index in 0..storyboard.scenes().len() {
            let scene = &storyboard.scenes()[index];
            let path = self.layout().scene_image_path(index, scene.timestamp);

            if path.is_file() {
                tracing::info!(scene = index, path = %path.display(), "Reusing existing scene image");
                storyboard.scenes_mut()[index].image_url = Some(path_string(&path));
                report.reused.push(path);
                continue;
            }

            let prompt = scene_prompt(storyboard.art_style(), scene);
            match self
                .render(&format!("scene {index}"), &prompt, &reference_images, &path)
                .await
            {
                Ok(saved) => {
                    storyboard.scenes_mut()[index].image_url = Some(path_string(&saved));
                    report.generated.push(saved);
                }
                Err(error) => {
                    tracing::warn!(scene = index, error = %error, "Failed to generate scene");
                    storyboard.scenes_mut()[index].image_url = None;
                    report.failed.push(ItemFailure {
                        item: FailedItem::Scene { index },
                        error,
                    });
                }
            }
        }

        let final_path = self.store.save_final(storyboard).await?;
        tracing::info!(
            generated = report.generated.len(),
            reused = report.reused.len(),
            failed = report.failed.len(),
            "Phase 3 complete",
        );
        Ok((report, final_path))
    }

    // -----------------------------------------------------------------------
    // Composite runs
    // -----------------------------------------------------------------------

    /// Phases 2 and 3 over an existing storyboard.
    pub async fn produce(&self, storyboard: &mut Storyboard) -> Result<RunReport, PipelineError> {
        let design = self.design_elements(storyboard).await?;
        let (scenes, final_path) = self.render_scenes(storyboard, &design.references).await?;
        Ok(RunReport {
            elements: design.report,
            scenes,
            checkpoint_path: design.checkpoint_path,
            final_path,
        })
    }

    /// All three phases.
    pub async fn run_all(
        &self,
        audio_path: &Path,
        prompt: &str,
    ) -> Result<(Storyboard, RunReport), PipelineError> {
        let mut storyboard = self.analyze(audio_path, prompt).await?;
        let report = self.produce(&mut storyboard).await?;
        Ok((storyboard, report))
    }

    /// Reload the checkpoint of this output directory and continue.
    pub async fn resume(&self) -> Result<(Storyboard, RunReport), PipelineError> {
        let (mut storyboard, source) = self.store.load_for_resume().await?;
        tracing::info!(
            source = %source.display(),
            pending_elements = storyboard.pending_elements(),
            pending_scenes = storyboard.pending_scenes(),
            "Resuming processing",
        );
        let report = self.produce(&mut storyboard).await?;
        Ok((storyboard, report))
    }

    // ---- private helpers ----

    /// One image under the retry policy. Returns the error text on
    /// exhaustion.
    async fn render(
        &self,
        label: &str,
        prompt: &str,
        references: &[Vec<u8>],
        path: &Path,
    ) -> Result<PathBuf, String> {
        let client = self.client;
        let config = &self.image;
        self.policy
            .run(label, move |_| client.generate_image(prompt, references, config, path))
            .await
            .map_err(|exhausted| exhausted.last_error.to_string())
    }
}

/// The element's image if it is already on disk, either at its derived
/// path or at the path recorded in the checkpoint.
fn reusable_element_image(derived: &Path, recorded: Option<&str>) -> Option<PathBuf> {
    if derived.is_file() {
        return Some(derived.to_path_buf());
    }
    recorded
        .map(PathBuf::from)
        .filter(|recorded| recorded.is_file())
}

/// Read every reference image once; unreadable ones are skipped.
async fn load_references(paths: &[PathBuf]) -> Vec<Vec<u8>> {
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        match tokio::fs::read(path).await {
            Ok(bytes) => images.push(bytes),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable reference image");
            }
        }
    }
    images
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
