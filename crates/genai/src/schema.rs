//! Response schema sent with the analysis request.
//!
//! Mirrors the field names of [`dreamer_core::storyboard::Storyboard`] in the
//! OpenAPI subset accepted by `generationConfig.responseSchema`. Output-only
//! fields (`image_url`) are left out so the model never invents paths.

use serde_json::{json, Value};

pub fn storyboard_response_schema() -> Value {
    let element = json!({
        "type": "OBJECT",
        "properties": {
            "name": {"type": "STRING"},
            "description": {"type": "STRING"}
        },
        "required": ["name", "description"]
    });

    let scene = json!({
        "type": "OBJECT",
        "properties": {
            "timestamp": {"type": "NUMBER", "description": "Seconds from the start of the audio"},
            "timing_rationale": {"type": "STRING"},
            "description": {"type": "STRING"},
            "visual_prompt": {"type": "STRING"}
        },
        "required": ["timestamp", "timing_rationale", "description", "visual_prompt"]
    });

    json!({
        "type": "OBJECT",
        "properties": {
            "title": {"type": "STRING"},
            "production_design": {
                "type": "OBJECT",
                "properties": {
                    "art_style": {"type": "STRING"},
                    "recurring_elements": {"type": "ARRAY", "items": element}
                },
                "required": ["art_style", "recurring_elements"]
            },
            "scenes": {"type": "ARRAY", "items": scene}
        },
        "required": ["title", "production_design", "scenes"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_requires_top_level_fields() {
        let schema = storyboard_response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required, vec!["title", "production_design", "scenes"]);
    }

    #[test]
    fn schema_omits_image_urls() {
        let schema = storyboard_response_schema();
        let scene_props = &schema["properties"]["scenes"]["items"]["properties"];
        assert!(scene_props.get("image_url").is_none());
        assert!(scene_props.get("visual_prompt").is_some());
    }
}
