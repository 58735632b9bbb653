//! reqwest-backed client for OpenAI-compatible `/chat/completions` APIs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

use crate::models::{UpstreamRequest, UpstreamResponse};

use super::{CompletionClient, ProviderError};

/// Talks to a single chat-completion endpoint over HTTP(S).
///
/// Cloning is cheap: the underlying `reqwest::Client` is reference-counted
/// and its connection pool is shared between clones and concurrent calls.
#[derive(Debug, Clone)]
pub struct HttpCompletionClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCompletionClient {
    /// Create a client posting to `endpoint` with a whole-request `timeout`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("review-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Build(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// The URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(
        &self,
        api_key: &str,
        request: &UpstreamRequest,
    ) -> Result<UpstreamResponse, ProviderError> {
        let payload =
            serde_json::to_vec(request).map_err(|e| ProviderError::Serialize(e.to_string()))?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {api_key}"))
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| ProviderError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            // Best effort: the status line alone is still useful if the body can't be read.
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.to_string(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Unreachable(e.to_string())
            } else {
                ProviderError::Decode(e.to_string())
            }
        })?;

        serde_json::from_slice(&bytes).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatMessage, SamplingParams};

    #[test]
    fn client_keeps_endpoint() {
        let client = HttpCompletionClient::new(
            "https://api.example.com/v1/chat/completions",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.endpoint(), "https://api.example.com/v1/chat/completions");
    }

    #[tokio::test]
    async fn unreachable_host_maps_to_unreachable() {
        // Grab a free port, then release it so nothing is listening there.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = HttpCompletionClient::new(
            format!("http://127.0.0.1:{port}/v1/chat/completions"),
            Duration::from_secs(2),
        )
        .unwrap();
        let request = UpstreamRequest::new(SamplingParams::REVIEW, vec![ChatMessage::user("x")]);

        let err = client.complete("sk-test", &request).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unreachable(_)), "got {err:?}");
    }
}
