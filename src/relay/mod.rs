//! The review relay: validate a request, build the prompt, call upstream,
//! and translate the outcome into an HTTP reply.
//!
//! Each call to [`ReviewRelay::handle`] is independent. The relay holds no
//! mutable state, so a single instance behind an `Arc` serves any number of
//! concurrent requests without locking.

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use thiserror::Error;
use tracing::Instrument;

use crate::env::ApiKeySource;
use crate::models::{ReviewRequest, ReviewResponse, SamplingParams, UpstreamRequest};
use crate::prompt;
use crate::providers::{CompletionClient, ProviderError};

const JSON_CONTENT_TYPE: &str = "application/json";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Failures of a single relay call. Each maps to a status code via
/// [`RelayError::status`]; the `Display` text is what the caller sees.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("invalid JSON body: {0}")]
    BadRequest(String),

    #[error("credential not configured: set the {var} environment variable")]
    CredentialMissing { var: String },

    #[error("failed to serialize upstream request: {0}")]
    Serialize(String),

    /// Transport failure or timeout. The detail is logged, not returned.
    #[error("failed to reach the completion API")]
    UpstreamUnreachable(String),

    /// Raw upstream status line and body, passed through for operators.
    #[error("completion API returned an error: {status}\n{body}")]
    UpstreamStatus { status: String, body: String },

    #[error("response decode failure")]
    ResponseDecode(String),

    #[error("empty response from the completion API")]
    EmptyResponse,

    #[error("failed to encode review: {0}")]
    Encode(String),
}

impl RelayError {
    /// HTTP status returned to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::CredentialMissing { .. }
            | RelayError::Serialize(_)
            | RelayError::UpstreamUnreachable(_)
            | RelayError::UpstreamStatus { .. }
            | RelayError::ResponseDecode(_)
            | RelayError::EmptyResponse
            | RelayError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ProviderError> for RelayError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Serialize(msg) => RelayError::Serialize(msg),
            ProviderError::Unreachable(msg) | ProviderError::Build(msg) => {
                RelayError::UpstreamUnreachable(msg)
            }
            ProviderError::Status { status, body } => RelayError::UpstreamStatus { status, body },
            ProviderError::Decode(msg) => RelayError::ResponseDecode(msg),
        }
    }
}

/// Status, content type, and body of a finished call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayReply {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl RelayReply {
    fn json(body: String) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: JSON_CONTENT_TYPE,
            body,
        }
    }

    fn error(err: &RelayError) -> Self {
        Self {
            status: err.status(),
            content_type: TEXT_CONTENT_TYPE,
            body: format!("{err}\n"),
        }
    }
}

/// Turns diffs into reviews via an upstream completion API.
pub struct ReviewRelay {
    client: Arc<dyn CompletionClient>,
    api_key: ApiKeySource,
    params: SamplingParams,
}

impl ReviewRelay {
    pub fn new(client: Arc<dyn CompletionClient>, api_key: ApiKeySource) -> Self {
        Self {
            client,
            api_key,
            params: SamplingParams::REVIEW,
        }
    }

    /// Build the upstream request for `diff`. Only the message text depends
    /// on the input.
    pub fn build_request(&self, diff: &str) -> UpstreamRequest {
        UpstreamRequest::new(self.params, prompt::build_messages(diff))
    }

    /// Handle one inbound call and always produce a reply.
    pub async fn handle(&self, method: &Method, body: &[u8]) -> RelayReply {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("review", %request_id, %method);

        async {
            match self.review(method, body).await {
                Ok(response) => match response.to_json() {
                    Ok(json) => {
                        tracing::info!(review_len = response.review.len(), "review delivered");
                        RelayReply::json(json)
                    }
                    Err(e) => {
                        let err = RelayError::Encode(e.to_string());
                        tracing::error!(error = %err, "failed to encode review");
                        RelayReply::error(&err)
                    }
                },
                Err(err) => {
                    log_failure(&err);
                    RelayReply::error(&err)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Run the review pipeline, returning the typed result.
    ///
    /// Checks run in order: method, body, credential. Nothing is sent
    /// upstream unless all three pass.
    pub async fn review(&self, method: &Method, body: &[u8]) -> Result<ReviewResponse, RelayError> {
        if *method != Method::POST {
            return Err(RelayError::MethodNotAllowed);
        }

        let request =
            ReviewRequest::from_slice(body).map_err(|e| RelayError::BadRequest(e.to_string()))?;

        let api_key = self
            .api_key
            .resolve()
            .ok_or_else(|| RelayError::CredentialMissing {
                var: self.api_key.var_name().to_string(),
            })?;

        tracing::debug!(diff_len = request.diff.len(), "sending diff upstream");
        let upstream = self.build_request(&request.diff);
        let response = self.client.complete(&api_key, &upstream).await?;

        let review = response
            .first_content()
            .ok_or(RelayError::EmptyResponse)?
            .to_string();

        Ok(ReviewResponse { review })
    }
}

fn log_failure(err: &RelayError) {
    match err {
        RelayError::MethodNotAllowed | RelayError::BadRequest(_) => {
            tracing::info!(error = %err, "rejected request");
        }
        RelayError::UpstreamUnreachable(detail) | RelayError::ResponseDecode(detail) => {
            tracing::warn!(error = %err, %detail, "upstream call failed");
        }
        RelayError::UpstreamStatus { status, .. } => {
            tracing::warn!(%status, "completion API returned an error");
        }
        RelayError::EmptyResponse => {
            tracing::warn!(error = %err, "upstream call failed");
        }
        RelayError::CredentialMissing { .. } | RelayError::Serialize(_) | RelayError::Encode(_) => {
            tracing::error!(error = %err, "relay misconfigured");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::env::Env;
    use crate::models::{Choice, UpstreamResponse};
    use crate::models::chat::ResponseMessage;

    /// Canned outcome for [`FakeClient`].
    enum Canned {
        Content(&'static str),
        NoChoices,
        Fail(fn() -> ProviderError),
    }

    struct FakeClient {
        canned: Canned,
        seen: Mutex<Vec<(String, UpstreamRequest)>>,
    }

    impl FakeClient {
        fn new(canned: Canned) -> Arc<Self> {
            Arc::new(Self {
                canned,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionClient for FakeClient {
        async fn complete(
            &self,
            api_key: &str,
            request: &UpstreamRequest,
        ) -> Result<UpstreamResponse, ProviderError> {
            self.seen
                .lock()
                .unwrap()
                .push((api_key.to_string(), request.clone()));
            match &self.canned {
                Canned::Content(text) => Ok(UpstreamResponse {
                    choices: vec![Choice {
                        message: ResponseMessage {
                            content: Some(text.to_string()),
                        },
                    }],
                }),
                Canned::NoChoices => Ok(UpstreamResponse::default()),
                Canned::Fail(make) => Err(make()),
            }
        }
    }

    fn relay_with(client: Arc<FakeClient>, key: Option<&str>) -> ReviewRelay {
        let env = match key {
            Some(k) => Env::mock([("API_KEY", k)]),
            None => Env::mock(Vec::<(&str, &str)>::new()),
        };
        ReviewRelay::new(client, ApiKeySource::new(env, "API_KEY"))
    }

    #[tokio::test]
    async fn non_post_is_rejected_without_upstream_call() {
        let client = FakeClient::new(Canned::Content("LGTM"));
        let relay = relay_with(client.clone(), Some("sk"));

        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH, Method::HEAD] {
            let reply = relay.handle(&method, br#"{"diff":"x"}"#).await;
            assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(reply.content_type, TEXT_CONTENT_TYPE);
        }
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn bad_body_is_rejected_without_upstream_call() {
        let client = FakeClient::new(Canned::Content("LGTM"));
        let relay = relay_with(client.clone(), Some("sk"));

        let bodies: [&[u8]; 4] = [b"not json", b"{}", br#"{"diff":1}"#, b""];
        for body in bodies {
            let reply = relay.handle(&Method::POST, body).await;
            assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        }
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn missing_credential_is_500_without_upstream_call() {
        let client = FakeClient::new(Canned::Content("LGTM"));
        let relay = relay_with(client.clone(), None);

        let reply = relay.handle(&Method::POST, br#"{"diff":"x"}"#).await;
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(reply.body.contains("credential not configured"));
        assert!(reply.body.contains("API_KEY"));
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn method_and_body_are_checked_before_credential() {
        let client = FakeClient::new(Canned::Content("LGTM"));
        let relay = relay_with(client.clone(), None);

        let reply = relay.handle(&Method::GET, br#"{"diff":"x"}"#).await;
        assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(reply.body, "method not allowed\n");

        let reply = relay.handle(&Method::POST, b"{}").await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert!(!reply.body.contains("API_KEY"));

        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn success_returns_first_choice_as_review() {
        let client = FakeClient::new(Canned::Content("## OK & <fine>"));
        let relay = relay_with(client.clone(), Some("sk-live"));

        let reply = relay.handle(&Method::POST, br#"{"diff":"+fn main() {}"}"#).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.content_type, JSON_CONTENT_TYPE);
        assert_eq!(reply.body, r###"{"review":"## OK & <fine>"}"###);

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "sk-live");
        assert!(seen[0].1.messages[0].content.contains("+fn main() {}"));
    }

    #[tokio::test]
    async fn empty_choices_is_500() {
        let relay = relay_with(FakeClient::new(Canned::NoChoices), Some("sk"));
        let reply = relay.handle(&Method::POST, br#"{"diff":"x"}"#).await;
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(reply.body.contains("empty response"));
    }

    #[tokio::test]
    async fn upstream_status_is_passed_through() {
        let relay = relay_with(
            FakeClient::new(Canned::Fail(|| ProviderError::Status {
                status: "503 Service Unavailable".to_string(),
                body: "overloaded".to_string(),
            })),
            Some("sk"),
        );
        let reply = relay.handle(&Method::POST, br#"{"diff":"x"}"#).await;
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(reply.body.contains("503"));
        assert!(reply.body.contains("overloaded"));
    }

    #[tokio::test]
    async fn transport_failure_hides_detail() {
        let relay = relay_with(
            FakeClient::new(Canned::Fail(|| {
                ProviderError::Unreachable("dns error: secret-host.internal".to_string())
            })),
            Some("sk"),
        );
        let err = relay.review(&Method::POST, br#"{"diff":"x"}"#).await.unwrap_err();
        assert!(matches!(err, RelayError::UpstreamUnreachable(_)));
        assert!(!err.to_string().contains("secret-host"));
    }

    #[tokio::test]
    async fn decode_failure_is_reported() {
        let relay = relay_with(
            FakeClient::new(Canned::Fail(|| ProviderError::Decode("expected value".to_string()))),
            Some("sk"),
        );
        let reply = relay.handle(&Method::POST, br#"{"diff":"x"}"#).await;
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reply.body, "response decode failure\n");
    }

    #[test]
    fn request_shape_ignores_diff_content() {
        let relay = relay_with(FakeClient::new(Canned::NoChoices), Some("sk"));
        for diff in ["", "plain", "\"quoted\" \\ {json}", "<script>&amp;</script>", "日本語\n\t"] {
            let req = relay.build_request(diff);
            assert_eq!(req.params, SamplingParams::REVIEW);
            assert_eq!(req.messages.len(), 1);
            assert!(req.messages[0].content.contains(diff));
        }
    }

    #[test]
    fn error_statuses() {
        assert_eq!(RelayError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(RelayError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(RelayError::EmptyResponse.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
