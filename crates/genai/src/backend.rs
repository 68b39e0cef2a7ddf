//! Capability boundary between the client and a remote model service.

use async_trait::async_trait;

use crate::error::GenerationError;
use crate::messages::{GenerateContentRequest, GenerateContentResponse};

/// A service that answers one `generateContent` request per call.
///
/// Implementations make exactly one attempt; retries are layered on top by
/// [`RetryPolicy`](crate::retry::RetryPolicy).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenerationError>;
}
