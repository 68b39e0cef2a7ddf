//! Scripted in-memory backend for tests.
//!
//! [`MockBackend`] records every request it receives and answers from, in
//! order: prompt-matching failure rules, the queue of scripted replies, then
//! an optional fallback reply. Clones share state, so a test can hand one
//! clone to the client and inspect calls through another.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use dreamer_core::storyboard::Storyboard;

use crate::backend::GenerationBackend;
use crate::error::GenerationError;
use crate::messages::{GenerateContentRequest, GenerateContentResponse};

/// Status code reported for scripted failures.
const MOCK_ERROR_STATUS: u16 = 500;

/// One scripted answer.
#[derive(Debug, Clone)]
pub enum MockReply {
    Response(GenerateContentResponse),
    Error(String),
}

/// A request the mock received.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub request: GenerateContentRequest,
}

impl RecordedCall {
    /// Concatenated text parts of the request.
    pub fn prompt(&self) -> String {
        self.request
            .contents
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect()
    }

    /// Number of inline image parts (reference images).
    pub fn image_parts(&self) -> usize {
        self.request
            .contents
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter(|p| {
                p.inline_data
                    .as_ref()
                    .is_some_and(|b| b.mime_type.starts_with("image/"))
            })
            .count()
    }
}

#[derive(Default)]
struct MockState {
    script: VecDeque<MockReply>,
    fallback: Option<MockReply>,
    fail_rules: Vec<(String, String)>,
    calls: Vec<RecordedCall>,
}

#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that answers every call with the same inline PNG payload.
    pub fn always_image(bytes: &[u8]) -> Self {
        let mock = Self::new();
        mock.set_fallback(MockReply::Response(
            GenerateContentResponse::from_inline_image("image/png", bytes),
        ));
        mock
    }

    /// Backend that fails every call.
    pub fn always_failing(message: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.set_fallback(MockReply::Error(message.into()));
        mock
    }

    pub fn push_response(&self, response: GenerateContentResponse) {
        self.lock().script.push_back(MockReply::Response(response));
    }

    pub fn push_error(&self, message: impl Into<String>) {
        self.lock().script.push_back(MockReply::Error(message.into()));
    }

    /// Queue an analysis answer carrying `storyboard` as structured output.
    pub fn push_storyboard(&self, storyboard: &Storyboard) {
        let value = serde_json::to_value(storyboard).unwrap_or_default();
        self.push_response(GenerateContentResponse::from_parsed(value));
    }

    pub fn set_fallback(&self, reply: MockReply) {
        self.lock().fallback = Some(reply);
    }

    /// Fail every call whose prompt text contains `needle`.
    pub fn fail_when_prompt_contains(&self, needle: impl Into<String>, message: impl Into<String>) {
        self.lock().fail_rules.push((needle.into(), message.into()));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Number of calls whose prompt contains `needle`.
    pub fn calls_matching(&self, needle: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.prompt().contains(needle))
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenerationError> {
        let mut state = self.lock();
        let call = RecordedCall {
            model: model.to_string(),
            request: request.clone(),
        };
        let prompt = call.prompt();
        state.calls.push(call);

        let rule = state
            .fail_rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, message)| MockReply::Error(message.clone()));

        let reply = rule
            .or_else(|| state.script.pop_front())
            .or_else(|| state.fallback.clone())
            .unwrap_or_else(|| MockReply::Error("mock backend has no scripted reply".to_string()));

        match reply {
            MockReply::Response(response) => Ok(response),
            MockReply::Error(body) => Err(GenerationError::Api {
                status: MOCK_ERROR_STATUS,
                body,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::messages::{Content, Part};

    fn request(prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: None,
                parts: vec![Part::inline("image/png", b"ref"), Part::text(prompt)],
            }],
            generation_config: None,
        }
    }

    #[tokio::test]
    async fn script_is_consumed_before_fallback() {
        let mock = MockBackend::always_image(b"fallback");
        mock.push_error("first");

        let first = mock.generate_content("m", &request("a")).await;
        let second = mock.generate_content("m", &request("b")).await;

        assert_matches!(first, Err(GenerationError::Api { status: 500, .. }));
        assert_eq!(second.unwrap().into_image_bytes().unwrap(), b"fallback".to_vec());
    }

    #[tokio::test]
    async fn prompt_rules_take_precedence() {
        let mock = MockBackend::always_image(b"ok");
        mock.fail_when_prompt_contains("Villain", "content policy");

        assert!(mock.generate_content("m", &request("draw Hero")).await.is_ok());
        let err = mock
            .generate_content("m", &request("draw Villain"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("content policy"));
        assert_eq!(mock.calls_matching("Villain"), 1);
    }

    #[tokio::test]
    async fn empty_mock_errors() {
        let mock = MockBackend::new();
        assert!(mock.generate_content("m", &request("x")).await.is_err());
    }

    #[tokio::test]
    async fn clones_share_recorded_calls() {
        let mock = MockBackend::always_image(b"x");
        let clone = mock.clone();
        clone.generate_content("img-model", &request("hello")).await.unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, "img-model");
        assert_eq!(calls[0].prompt(), "hello");
        assert_eq!(calls[0].image_parts(), 1);
    }
}
