//! Prompt text for the three generation phases.

use crate::storyboard::{Scene, VisualElement};

/// Instruction sent with the audio in Phase 1.
pub const ANALYSIS_PROMPT: &str = "You are a world-class production designer.\n\
Listen to this audio and plan a highly COHERENT visual experience.\n\n\
PHASE 1: VISUAL DESIGN\n\
Define a consistent 'art_style'.\n\
Identify 'recurring_elements' (characters/objects). \
Provide a detailed description for each.\n\n\
PHASE 2: STORYBOARDING\n\
Create scenes precisely synchronized with the audio.\n\
For each scene, provide a 'visual_prompt' that references \
the 'recurring_elements' by name.";

/// Reference-sheet prompt for one recurring element.
pub fn element_prompt(art_style: &str, element: &VisualElement) -> String {
    format!(
        "Production Design: Element Reference Sheet. \
         Style: {art_style}. \
         Subject: {}. \
         Description: {}. \
         Show only this subject against a neutral background for reference.",
        element.name, element.description,
    )
}

/// Scene prompt asking the model to stay coherent with the references.
pub fn scene_prompt(art_style: &str, scene: &Scene) -> String {
    format!(
        "Using the provided visual references for character/element consistency \
         and following the style '{art_style}', \
         create this scene: {}. \
         Maintain perfect visual coherence with the references.",
        scene.visual_prompt,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_prompt_includes_style_name_and_description() {
        let el = VisualElement::new("Char1", "Desc1");
        let prompt = element_prompt("Sketch", &el);
        assert!(prompt.contains("Style: Sketch."));
        assert!(prompt.contains("Subject: Char1."));
        assert!(prompt.contains("Description: Desc1."));
    }

    #[test]
    fn scene_prompt_includes_style_and_visual_prompt() {
        let scene = Scene::new(0.0, "Start", "Scene1", "Draw Scene 1");
        let prompt = scene_prompt("Sketch", &scene);
        assert!(prompt.contains("style 'Sketch'"));
        assert!(prompt.contains("create this scene: Draw Scene 1."));
        assert!(prompt.contains("coherence with the references"));
    }

    #[test]
    fn analysis_prompt_names_schema_fields() {
        assert!(ANALYSIS_PROMPT.contains("art_style"));
        assert!(ANALYSIS_PROMPT.contains("recurring_elements"));
        assert!(ANALYSIS_PROMPT.contains("visual_prompt"));
    }
}
