//! HTTP server setup and the relay handler.
//!
//! # Responsibilities
//! - Create the Axum router with the alias and model-mirroring routes
//! - Wire up middleware (request ID, tracing)
//! - Relay each request to the inference API and audit the outcome
//! - Serve until the shutdown signal fires, draining in-flight requests

use std::io;
use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{Request, StatusCode},
    response::Response,
    routing::post,
    Router,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{RelayConfig, ANALYZE_ALIAS_PATH};
use crate::http::request::{read_json_body, InboundView, UuidRequestId};
use crate::http::response::{error_payload, json_response};
use crate::observability::{metrics, AuditLogger};
use crate::upstream::{ClientError, UpstreamClient, UpstreamReply};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: UpstreamClient,
    pub audit: AuditLogger,
    pub max_body_size: usize,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a server that audits through `audit`.
    pub fn new(config: RelayConfig, audit: AuditLogger) -> Result<Self, ClientError> {
        let upstream = UpstreamClient::new(&config.upstream, &config.timeouts)?;

        let state = AppState {
            upstream,
            audit,
            max_body_size: config.security.max_body_size,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        Router::new()
            .route(ANALYZE_ALIAS_PATH, post(handle_analyze))
            .route(&config.upstream.model_path(), post(handle_analyze))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            alias = ANALYZE_ALIAS_PATH,
            model_route = %self.config.upstream.model_path(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Relay one request: parse, forward, audit, respond.
///
/// Exactly one audit record is written on every path.
async fn handle_analyze(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let view = InboundView::capture(&parts);
    let route = parts
        .extensions
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| view.path.clone());

    tracing::debug!(
        request_id = %view.request_id,
        method = %view.method,
        path = %view.path,
        "Relaying request"
    );

    // The body stays null in the audit record when it never parsed.
    let (request_body, outcome) = match read_json_body(body, state.max_body_size).await {
        Ok(payload) => {
            let outcome = state.upstream.forward(&payload).await;
            (payload, outcome)
        }
        Err(e) => (Value::Null, Err(e)),
    };

    let (status, data) = match outcome {
        Ok(UpstreamReply { status, body }) => (status, body),
        Err(e) => {
            tracing::error!(
                request_id = %view.request_id,
                kind = e.kind(),
                error = %e,
                "Error processing request"
            );
            metrics::record_failure(e.kind());
            (StatusCode::INTERNAL_SERVER_ERROR, error_payload(&e))
        }
    };

    state.audit.record(&view, &request_body, &data, status);
    metrics::record_request(&route, status.as_u16(), view.started);

    json_response(status, data)
}
