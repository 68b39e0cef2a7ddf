//! REST client for the Gemini `generateContent` endpoint.
//!
//! Implements [`GenerationBackend`] with [`reqwest`]. One call is one HTTP
//! request; retrying is the caller's concern.

use async_trait::async_trait;

use crate::backend::GenerationBackend;
use crate::error::GenerationError;
use crate::messages::{GenerateContentRequest, GenerateContentResponse};

/// Public Gemini API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP client for a Gemini-compatible service.
pub struct GeminiApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiApi")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl GeminiApi {
    /// Create a client against [`DEFAULT_BASE_URL`].
    ///
    /// Fails with [`GenerationError::MissingApiKey`] when `api_key` is blank.
    pub fn new(api_key: impl Into<String>) -> Result<Self, GenerationError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom base URL (proxies, test servers).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, GenerationError> {
        Self::with_client(reqwest::Client::new(), api_key, base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, GenerationError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GenerationError::MissingApiKey);
        }
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST` target for `model`.
    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`GenerationError::Api`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GenerationError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GenerationError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl GenerationBackend for GeminiApi {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenerationError> {
        let parts: usize = request.contents.iter().map(|c| c.parts.len()).sum();
        tracing::debug!(model, parts, "Sending generateContent request");

        let response = self
            .client
            .post(self.endpoint(model))
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn blank_key_is_rejected() {
        assert_matches!(GeminiApi::new(""), Err(GenerationError::MissingApiKey));
        assert_matches!(GeminiApi::new("   "), Err(GenerationError::MissingApiKey));
    }

    #[test]
    fn debug_output_hides_key() {
        let api = GeminiApi::new("super-secret").unwrap();
        let rendered = format!("{api:?}");
        assert!(rendered.contains("generativelanguage.googleapis.com"));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn endpoint_uses_default_base() {
        let api = GeminiApi::new("key").unwrap();
        assert_eq!(
            api.endpoint("gemini-2.5-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let api = GeminiApi::with_base_url("key", "http://localhost:8080/v1/").unwrap();
        assert_eq!(api.base_url(), "http://localhost:8080/v1");
        assert_eq!(
            api.endpoint("m"),
            "http://localhost:8080/v1/models/m:generateContent"
        );
    }

    #[tokio::test]
    async fn unreachable_server_is_request_error() {
        // Port 9 (discard) on localhost is not expected to speak HTTP.
        let api = GeminiApi::with_base_url("key", "http://127.0.0.1:9").unwrap();
        let result = api
            .generate_content("m", &GenerateContentRequest::default())
            .await;
        assert_matches!(result, Err(GenerationError::Request(_)));
    }
}
