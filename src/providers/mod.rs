//! CompletionClient trait and upstream LLM integration.
//!
//! Provides an abstraction layer over the HTTP client so the relay can be
//! exercised against a recording fake in tests.

pub mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{UpstreamRequest, UpstreamResponse};

pub use http::HttpCompletionClient;

/// Errors from the completion client.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("failed to create HTTP client: {0}")]
    Build(String),

    #[error("failed to serialize upstream request: {0}")]
    Serialize(String),

    #[error("completion API unreachable: {0}")]
    Unreachable(String),

    /// Non-200 reply. `status` is the full status line, e.g. `503 Service Unavailable`.
    #[error("completion API returned {status}: {body}")]
    Status { status: String, body: String },

    #[error("failed to decode completion response: {0}")]
    Decode(String),
}

/// Trait for an OpenAI-compatible chat-completion backend.
///
/// Implementations send exactly one request per call and never retry.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send `request` authorised with `api_key` and return the parsed reply.
    async fn complete(
        &self,
        api_key: &str,
        request: &UpstreamRequest,
    ) -> Result<UpstreamResponse, ProviderError>;
}
