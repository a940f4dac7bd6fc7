//! Inbound request capture.
//!
//! # Responsibilities
//! - Generate a request ID (UUID v4) when the client sent none
//! - Snapshot request metadata at entry for the audit record
//! - Read the body under the configured size limit and parse it as JSON
//!
//! # Design Decisions
//! - The snapshot is taken before the body is consumed and never changes
//! - Header names are the canonical lowercase form; a repeated header keeps
//!   its first position and its last value
//! - A repeated query argument keeps its first value

use std::net::SocketAddr;
use std::time::Instant;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, HeaderValue, Request};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tower_http::request_id::{MakeRequestId, RequestId};

use crate::http::user_agent::UserAgent;
use crate::upstream::{error_chain, RelayError};

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Header whose presence adds `original_ip` to the audit record.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Generates UUID v4 request IDs for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&uuid::Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Read-only snapshot of an inbound request, taken at entry.
#[derive(Debug, Clone)]
pub struct InboundView {
    pub received_at: DateTime<Utc>,
    pub started: Instant,
    pub method: String,
    pub url: String,
    pub base_url: String,
    pub path: String,
    pub headers: Map<String, Value>,
    pub args: Map<String, Value>,
    pub remote_ip: Option<String>,
    pub remote_port: Option<u16>,
    pub forwarded_for: Option<String>,
    pub user_agent: UserAgent,
    pub protocol: String,
    pub request_id: String,
}

impl InboundView {
    /// Snapshot the request head. The peer address comes from axum's
    /// `ConnectInfo` extension when the server was started with it.
    pub fn capture(parts: &Parts) -> Self {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        let host = header_string(&parts.headers, header::HOST.as_str())
            .or_else(|| parts.uri.authority().map(|a| a.to_string()))
            .unwrap_or_else(|| "localhost".to_string());
        let path = parts.uri.path().to_string();
        let base_url = format!("http://{}{}", host, path);
        let url = match parts.uri.query() {
            Some(query) if !query.is_empty() => format!("{}?{}", base_url, query),
            _ => base_url.clone(),
        };

        Self {
            received_at: Utc::now(),
            started: Instant::now(),
            method: parts.method.to_string(),
            url,
            base_url,
            path,
            headers: header_map(&parts.headers),
            args: query_args(parts.uri.query().unwrap_or_default()),
            remote_ip: peer.map(|addr| addr.ip().to_string()),
            remote_port: peer.map(|addr| addr.port()),
            forwarded_for: header_string(&parts.headers, X_FORWARDED_FOR)
                .filter(|v| !v.is_empty()),
            user_agent: UserAgent::parse(
                &header_string(&parts.headers, header::USER_AGENT.as_str()).unwrap_or_default(),
            ),
            protocol: format!("{:?}", parts.version),
            request_id: header_string(&parts.headers, X_REQUEST_ID).unwrap_or_default(),
        }
    }

    /// Seconds elapsed since the request arrived.
    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
}

fn header_map(headers: &HeaderMap) -> Map<String, Value> {
    let mut map = Map::new();
    for (name, value) in headers {
        map.insert(
            name.as_str().to_string(),
            Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
        );
    }
    map
}

fn query_args(query: &str) -> Map<String, Value> {
    let mut map = Map::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if !map.contains_key(key.as_ref()) {
            map.insert(key.into_owned(), Value::String(value.into_owned()));
        }
    }
    map
}

/// Collect the body (bounded by `limit` bytes) and parse it as JSON.
///
/// No schema is applied; any JSON value is accepted. An empty body is a
/// parse failure.
pub async fn read_json_body(body: Body, limit: usize) -> Result<Value, RelayError> {
    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| RelayError::RequestBody(error_chain(&e)))?;
    serde_json::from_slice(&bytes).map_err(RelayError::RequestJson)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parts_of(request: Request<Body>) -> Parts {
        request.into_parts().0
    }

    #[test]
    fn test_capture_urls_and_args() {
        let parts = parts_of(
            Request::builder()
                .method("POST")
                .uri("/analyze-sentiment?lang=en&debug=1&lang=fr")
                .header("Host", "relay.local:8080")
                .body(Body::empty())
                .unwrap(),
        );
        let view = InboundView::capture(&parts);

        assert_eq!(view.method, "POST");
        assert_eq!(view.path, "/analyze-sentiment");
        assert_eq!(view.base_url, "http://relay.local:8080/analyze-sentiment");
        assert_eq!(
            view.url,
            "http://relay.local:8080/analyze-sentiment?lang=en&debug=1&lang=fr"
        );
        assert_eq!(Value::Object(view.args), json!({"lang": "en", "debug": "1"}));
        assert_eq!(view.protocol, "HTTP/1.1");
        assert_eq!(view.request_id, "");
        assert_eq!(view.remote_ip, None);
    }

    #[test]
    fn test_repeated_header_keeps_last_value() {
        let parts = parts_of(
            Request::builder()
                .uri("/")
                .header("x-custom", "first")
                .header("accept", "application/json")
                .header("x-custom", "second")
                .body(Body::empty())
                .unwrap(),
        );
        let view = InboundView::capture(&parts);

        let keys: Vec<_> = view.headers.keys().cloned().collect();
        assert_eq!(keys, vec!["x-custom", "accept"]);
        assert_eq!(view.headers["x-custom"], "second");
    }

    #[test]
    fn test_forwarded_for_and_peer() {
        let mut parts = parts_of(
            Request::builder()
                .uri("/")
                .header("X-Forwarded-For", "203.0.113.5")
                .header("User-Agent", "curl/8.4.0")
                .header(X_REQUEST_ID, "abc-123")
                .body(Body::empty())
                .unwrap(),
        );
        let peer: SocketAddr = "10.0.0.7:51234".parse().unwrap();
        parts.extensions.insert(ConnectInfo(peer));

        let view = InboundView::capture(&parts);
        assert_eq!(view.forwarded_for.as_deref(), Some("203.0.113.5"));
        assert_eq!(view.remote_ip.as_deref(), Some("10.0.0.7"));
        assert_eq!(view.remote_port, Some(51234));
        assert_eq!(view.user_agent.browser.as_deref(), Some("curl"));
        assert_eq!(view.request_id, "abc-123");
    }

    #[test]
    fn test_empty_forwarded_for_ignored() {
        let parts = parts_of(
            Request::builder()
                .uri("/")
                .header("X-Forwarded-For", "")
                .body(Body::empty())
                .unwrap(),
        );
        assert_eq!(InboundView::capture(&parts).forwarded_for, None);
    }

    #[tokio::test]
    async fn test_read_json_body() {
        let value = read_json_body(Body::from(r#"{"inputs": "I love this!"}"#), 1024)
            .await
            .unwrap();
        assert_eq!(value, json!({"inputs": "I love this!"}));

        let err = read_json_body(Body::from("{not json"), 1024).await.unwrap_err();
        assert!(matches!(err, RelayError::RequestJson(_)));

        let err = read_json_body(Body::empty(), 1024).await.unwrap_err();
        assert!(matches!(err, RelayError::RequestJson(_)));

        let err = read_json_body(Body::from(vec![b'1'; 64]), 8).await.unwrap_err();
        assert!(matches!(err, RelayError::RequestBody(_)));
    }
}
