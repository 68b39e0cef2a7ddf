//! Generative model client library.
//!
//! Provides the Gemini wire types, a REST backend, the high-level
//! [`GenerationClient`] used for storyboard analysis and image rendering,
//! and the exponential-backoff [`RetryPolicy`] layered on top of it.

pub mod api;
pub mod backend;
pub mod client;
pub mod error;
pub mod messages;
pub mod retry;
pub mod schema;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use api::GeminiApi;
pub use backend::GenerationBackend;
pub use client::GenerationClient;
pub use error::GenerationError;
pub use retry::{RetryExhausted, RetryPolicy};
