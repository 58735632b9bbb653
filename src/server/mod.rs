//! Inbound HTTP surface.
//!
//! Binds `/review` on an axum router and hands every request, whatever its
//! method, to [`ReviewRelay::handle`]. The router runs on the tokio
//! multi-threaded runtime, one task per connection, so a slow upstream call
//! only holds up its own request.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use tokio::net::TcpListener;

use crate::constants::REVIEW_PATH;
use crate::relay::{RelayReply, ReviewRelay};

impl IntoResponse for RelayReply {
    fn into_response(self) -> Response {
        (self.status, [(CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

/// Build the application router.
///
/// Request bodies are unbounded; diffs of large merge requests easily exceed
/// axum's default limit.
pub fn router(relay: Arc<ReviewRelay>) -> Router {
    Router::new()
        .route(REVIEW_PATH, any(review))
        .layer(DefaultBodyLimit::disable())
        .with_state(relay)
}

async fn review(State(relay): State<Arc<ReviewRelay>>, method: Method, body: Bytes) -> RelayReply {
    relay.handle(&method, &body).await
}

/// Serve on `listener` until `shutdown` resolves, then drain in-flight requests.
pub async fn serve<F>(listener: TcpListener, relay: Arc<ReviewRelay>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(relay))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested, draining in-flight requests");
}
