//! Shared utilities for relay integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use sentiment_relay::config::AuditFormat;
use sentiment_relay::upstream::Secret;
use sentiment_relay::{AuditLogger, HttpServer, MemorySink, RelayConfig, Shutdown};
use tokio::net::TcpListener;

pub const MODEL_PATH: &str = "/models/cardiffnlp/twitter-roberta-base-sentiment-latest";
pub const TEST_TOKEN: &str = "hf_test_token";

/// What the mock upstream saw for one request.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Start a mock inference API that answers every POST to the model path
/// with a fixed status and raw body, recording what it received.
pub async fn start_mock_upstream(
    status: u16,
    body: &'static str,
) -> (SocketAddr, Arc<Mutex<Vec<CapturedRequest>>>) {
    start_mock_upstream_with_delay(status, body, Duration::ZERO).await
}

/// Like [`start_mock_upstream`], but sleeps before answering.
pub async fn start_mock_upstream_with_delay(
    status: u16,
    body: &'static str,
    delay: Duration,
) -> (SocketAddr, Arc<Mutex<Vec<CapturedRequest>>>) {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let seen = captured.clone();

    let app = Router::new().route(
        MODEL_PATH,
        post(move |headers: HeaderMap, bytes: Bytes| {
            let seen = seen.clone();
            async move {
                seen.lock().unwrap().push(CapturedRequest {
                    authorization: header(&headers, "authorization"),
                    content_type: header(&headers, "content-type"),
                    body: bytes,
                });
                tokio::time::sleep(delay).await;
                (
                    StatusCode::from_u16(status).unwrap(),
                    [("content-type", "application/json")],
                    body,
                )
                    .into_response()
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, captured)
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(String::from)
}

/// Relay config pointed at `upstream_base` with a test token.
pub fn relay_config(upstream_base: String) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.base_url = upstream_base;
    config.upstream.token = Some(Secret::new(TEST_TOKEN));
    config
}

/// A running relay and the handles tests need.
pub struct RunningRelay {
    pub addr: SocketAddr,
    pub audit: Arc<MemorySink>,
    pub shutdown: Shutdown,
}

impl RunningRelay {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start the relay on an ephemeral port with an in-memory audit sink.
pub async fn start_relay(config: RelayConfig) -> RunningRelay {
    let audit = Arc::new(MemorySink::new());
    let logger = AuditLogger::new(audit.clone(), AuditFormat::Json);
    let server = HttpServer::new(config, logger).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    RunningRelay {
        addr,
        audit,
        shutdown,
    }
}

/// HTTP client that never goes through a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
