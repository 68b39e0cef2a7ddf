//! Storyboard data model shared by every pipeline phase.
//!
//! A [`Storyboard`] is the root aggregate: it owns its [`ProductionDesign`]
//! (art style plus recurring [`VisualElement`]s) and an ordered list of
//! [`Scene`]s. Scenes are kept sorted by ascending timestamp at every entry
//! point: [`Storyboard::new`], deserialization, and [`Storyboard::set_scenes`].

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A recurring character or object that gets its own reference image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualElement {
    pub name: String,
    pub description: String,
    /// Local path of the rendered reference image; `None` until Phase 2
    /// succeeds for this element.
    #[serde(default)]
    pub image_url: Option<String>,
}

impl VisualElement {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            image_url: None,
        }
    }
}

/// One shot on the timeline, anchored at `timestamp` seconds into the audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub timestamp: f64,
    pub timing_rationale: String,
    pub description: String,
    pub visual_prompt: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Scene {
    pub fn new(
        timestamp: f64,
        timing_rationale: impl Into<String>,
        description: impl Into<String>,
        visual_prompt: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            timing_rationale: timing_rationale.into(),
            description: description.into(),
            visual_prompt: visual_prompt.into(),
            image_url: None,
        }
    }
}

/// Global look of the storyboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionDesign {
    /// Injected into every image prompt.
    pub art_style: String,
    /// In order of discovery by the analysis phase.
    pub recurring_elements: Vec<VisualElement>,
}

// ---------------------------------------------------------------------------
// Storyboard
// ---------------------------------------------------------------------------

/// Root aggregate exchanged between the three pipeline phases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoryboardDocument")]
pub struct Storyboard {
    pub title: String,
    pub production_design: ProductionDesign,
    scenes: Vec<Scene>,
}

/// Wire shape of a storyboard before the ordering invariant is applied.
#[derive(Deserialize)]
struct StoryboardDocument {
    title: String,
    production_design: ProductionDesign,
    scenes: Vec<Scene>,
}

impl From<StoryboardDocument> for Storyboard {
    fn from(doc: StoryboardDocument) -> Self {
        Storyboard::new(doc.title, doc.production_design, doc.scenes)
    }
}

/// Headline numbers shown after analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryboardSummary {
    pub title: String,
    pub art_style: String,
    pub element_count: usize,
    pub scene_count: usize,
}

impl Storyboard {
    pub fn new(
        title: impl Into<String>,
        production_design: ProductionDesign,
        scenes: Vec<Scene>,
    ) -> Self {
        let mut storyboard = Self {
            title: title.into(),
            production_design,
            scenes,
        };
        storyboard.sort_scenes();
        storyboard
    }

    /// Scenes in ascending timestamp order.
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// Mutable access for recording rendered image paths.
    ///
    /// Callers must not reorder timestamps through this slice; use
    /// [`set_scenes`](Self::set_scenes) to replace the timeline.
    pub fn scenes_mut(&mut self) -> &mut [Scene] {
        &mut self.scenes
    }

    /// Replace the timeline, re-establishing timestamp order.
    pub fn set_scenes(&mut self, scenes: Vec<Scene>) {
        self.scenes = scenes;
        self.sort_scenes();
    }

    pub fn elements(&self) -> &[VisualElement] {
        &self.production_design.recurring_elements
    }

    pub fn elements_mut(&mut self) -> &mut [VisualElement] {
        &mut self.production_design.recurring_elements
    }

    pub fn art_style(&self) -> &str {
        &self.production_design.art_style
    }

    /// Number of elements without a rendered reference image.
    pub fn pending_elements(&self) -> usize {
        self.elements()
            .iter()
            .filter(|e| e.image_url.is_none())
            .count()
    }

    /// Number of scenes without a rendered image.
    pub fn pending_scenes(&self) -> usize {
        self.scenes.iter().filter(|s| s.image_url.is_none()).count()
    }

    pub fn summary(&self) -> StoryboardSummary {
        StoryboardSummary {
            title: self.title.clone(),
            art_style: self.production_design.art_style.clone(),
            element_count: self.production_design.recurring_elements.len(),
            scene_count: self.scenes.len(),
        }
    }

    // Stable, and total over f64 so a NaN timestamp cannot panic the sort.
    fn sort_scenes(&mut self) {
        self.scenes
            .sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
