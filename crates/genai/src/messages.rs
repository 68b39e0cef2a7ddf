//! `generateContent` request/response types and response normalization.
//!
//! The backend speaks JSON shaped like
//! `{"contents": [{"parts": [{"text": ...}, {"inlineData": {...}}]}]}`.
//! Responses come back as a list of candidates whose parts carry either
//! text or base64 inline data. Helpers at the bottom of this module reduce
//! a response to the two things the pipeline needs: a storyboard payload
//! or image bytes.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use dreamer_core::storyboard::Storyboard;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Body of a `generateContent` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// A single turn of multimodal content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Either a text fragment or an inline binary blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<Blob>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    /// Inline part; `data` is base64-encoded for the wire.
    pub fn inline(mime_type: impl Into<String>, data: &[u8]) -> Self {
        Self {
            text: None,
            inline_data: Some(Blob {
                mime_type: mime_type.into(),
                data: BASE64.encode(data),
            }),
        }
    }
}

/// Base64 payload tagged with its MIME type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    pub data: String,
}

impl Blob {
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(self.data.as_bytes())
    }
}

/// Output negotiation for a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// Response of a `generateContent` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Structured result for backends that parse against the response
    /// schema server-side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed: Option<serde_json::Value>,
    /// Raw image bytes for backends that return them directly rather than
    /// as inline base64. Never present on the JSON wire.
    #[serde(skip)]
    pub bytes: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// What the analysis call produced, before schema validation.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisPayload {
    /// Already-parsed structured object.
    Structured(serde_json::Value),
    /// Text that still has to be parsed as a storyboard.
    RawText(String),
}

impl AnalysisPayload {
    /// Validate the payload against the storyboard schema.
    pub fn into_storyboard(self) -> Result<Storyboard, GenerationError> {
        match self {
            Self::Structured(value) => {
                serde_json::from_value(value).map_err(GenerationError::analysis)
            }
            Self::RawText(text) => {
                serde_json::from_str(strip_code_fence(&text)).map_err(GenerationError::analysis)
            }
        }
    }
}

impl GenerateContentResponse {
    /// Response holding a single text part.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::from_parts(vec![Part::text(text)])
    }

    /// Response holding a single inline image part.
    pub fn from_inline_image(mime_type: impl Into<String>, data: &[u8]) -> Self {
        Self::from_parts(vec![Part::inline(mime_type, data)])
    }

    /// Response carrying raw bytes directly.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Some(bytes.into()),
            ..Self::default()
        }
    }

    /// Response carrying a pre-parsed structured object.
    pub fn from_parsed(value: serde_json::Value) -> Self {
        Self {
            parsed: Some(value),
            ..Self::default()
        }
    }

    fn from_parts(parts: Vec<Part>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some("model".to_string()),
                    parts,
                }),
                finish_reason: None,
            }],
            ..Self::default()
        }
    }

    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }

    /// Concatenated text of the first candidate, if any.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .first_parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }

    /// Interpret the response as a storyboard.
    ///
    /// A non-null `parsed` object is tried first. When it is absent or does
    /// not match the schema, the candidate text is parsed instead. Fails
    /// with [`GenerationError::Analysis`] only when neither path yields a
    /// storyboard.
    pub fn storyboard(&self) -> Result<Storyboard, GenerationError> {
        let structured_err = match &self.parsed {
            Some(value) if !value.is_null() => {
                match AnalysisPayload::Structured(value.clone()).into_storyboard() {
                    Ok(storyboard) => return Ok(storyboard),
                    Err(e) => Some(e),
                }
            }
            _ => None,
        };
        match (self.text(), structured_err) {
            (Some(text), _) => AnalysisPayload::RawText(text).into_storyboard(),
            (None, Some(e)) => Err(e),
            (None, None) => Err(GenerationError::analysis(
                "response contained no storyboard",
            )),
        }
    }

    /// Reduce the response to image bytes.
    ///
    /// Raw `bytes` win; otherwise the first inline part of the first
    /// candidate is decoded. Fails with [`GenerationError::NoImageData`]
    /// when neither shape is present.
    pub fn into_image_bytes(self) -> Result<Vec<u8>, GenerationError> {
        if let Some(bytes) = self.bytes.filter(|b| !b.is_empty()) {
            return Ok(bytes);
        }
        let blob = self
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.iter().find_map(|p| p.inline_data.as_ref()))
            .ok_or(GenerationError::NoImageData)?;
        let bytes = blob.decode()?;
        if bytes.is_empty() {
            return Err(GenerationError::NoImageData);
        }
        Ok(bytes)
    }
}

/// Drop a surrounding Markdown code fence (```` ```json ... ``` ````), if any.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string (e.g. `json`) on the opening line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    const STORYBOARD_JSON: &str = r#"{
        "title": "Fallback",
        "production_design": {"art_style": "Fallback Style", "recurring_elements": []},
        "scenes": []
    }"#;

    // -- wire format ---------------------------------------------------------

    #[test]
    fn request_serializes_camel_case() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: None,
                parts: vec![Part::inline("audio/mpeg", b"abc"), Part::text("hi")],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                temperature: Some(0.4),
                ..GenerationConfig::default()
            }),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["inlineData"]["mimeType"], "audio/mpeg");
        assert_eq!(value["contents"][0]["parts"][0]["inlineData"]["data"], "YWJj");
        assert_eq!(value["contents"][0]["parts"][1]["text"], "hi");
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert!(value["generationConfig"].get("responseSchema").is_none());
    }

    #[test]
    fn response_parses_inline_image() {
        let raw = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "here you go"},
                    {"inlineData": {"mimeType": "image/png", "data": "AQID"}}
                ]},
                "finishReason": "STOP"
            }]
        });
        let response: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(response.into_image_bytes().unwrap(), vec![1, 2, 3]);
    }

    // -- image normalization -------------------------------------------------

    #[test]
    fn raw_bytes_take_precedence() {
        let mut response = GenerateContentResponse::from_inline_image("image/png", b"inline");
        response.bytes = Some(b"raw".to_vec());
        assert_eq!(response.into_image_bytes().unwrap(), b"raw".to_vec());
    }

    #[test]
    fn text_only_response_has_no_image() {
        let response = GenerateContentResponse::from_text("sorry");
        assert_matches!(response.into_image_bytes(), Err(GenerationError::NoImageData));
    }

    #[test]
    fn empty_response_has_no_image() {
        assert_matches!(
            GenerateContentResponse::default().into_image_bytes(),
            Err(GenerationError::NoImageData)
        );
    }

    #[test]
    fn invalid_base64_is_decode_error() {
        let mut response = GenerateContentResponse::from_text("x");
        response.candidates[0].content.as_mut().unwrap().parts[0].inline_data = Some(Blob {
            mime_type: "image/png".to_string(),
            data: "!!not base64!!".to_string(),
        });
        assert_matches!(response.into_image_bytes(), Err(GenerationError::Decode(_)));
    }

    // -- analysis normalization ----------------------------------------------

    #[test]
    fn valid_parsed_object_wins_over_text() {
        let mut response = GenerateContentResponse::from_text(STORYBOARD_JSON);
        response.parsed = Some(json!({
            "title": "Structured",
            "production_design": {"art_style": "Ink", "recurring_elements": []},
            "scenes": []
        }));
        assert_eq!(response.storyboard().unwrap().title, "Structured");
    }

    #[test]
    fn null_parsed_falls_back_to_text() {
        let mut response = GenerateContentResponse::from_text(STORYBOARD_JSON);
        response.parsed = Some(serde_json::Value::Null);
        assert_eq!(response.storyboard().unwrap().title, "Fallback");
    }

    #[test]
    fn invalid_parsed_falls_back_to_text() {
        let mut response = GenerateContentResponse::from_text(STORYBOARD_JSON);
        response.parsed = Some(json!({"unexpected": true}));
        assert_eq!(response.storyboard().unwrap().title, "Fallback");
    }

    #[test]
    fn invalid_parsed_without_text_is_analysis_error() {
        let response = GenerateContentResponse::from_parsed(json!({"unexpected": true}));
        let err = response.storyboard().unwrap_err();
        assert_matches!(err, GenerationError::Analysis { .. });
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn blank_text_yields_no_storyboard() {
        let err = GenerateContentResponse::from_text("  ").storyboard().unwrap_err();
        assert!(err.to_string().contains("no storyboard"));
    }

    #[test]
    fn structured_payload_validates_schema() {
        let bad = AnalysisPayload::Structured(json!({"title": "missing fields"}));
        assert_matches!(bad.into_storyboard(), Err(GenerationError::Analysis { .. }));
    }

    #[test]
    fn fenced_text_is_parsed() {
        let fenced = format!("```json\n{STORYBOARD_JSON}\n```");
        let storyboard = AnalysisPayload::RawText(fenced).into_storyboard().unwrap();
        assert_eq!(storyboard.production_design.art_style, "Fallback Style");
    }

    #[test]
    fn strip_code_fence_variants() {
        assert_eq!(strip_code_fence("  {}  "), "{}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```\n"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{}"), "{}");
    }
}
