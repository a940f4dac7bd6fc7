//! Upstream reply type, relay error taxonomy and the credential wrapper.

use std::fmt;

use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Bearer credential for the inference API.
///
/// Never printed: `Debug` is redacted and the type is not `Serialize`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw value, for building the `Authorization` header only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// What the inference API sent back, passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Value,
}

/// Every way a relay attempt can fail.
///
/// All variants surface to the caller identically (HTTP 500 with the
/// `Display` text); the split exists for operational logs.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The inbound body could not be read (disconnect, size limit).
    #[error("failed to read request body: {0}")]
    RequestBody(String),

    /// The inbound body is not valid JSON.
    #[error("failed to decode JSON request body: {0}")]
    RequestJson(#[source] serde_json::Error),

    /// The upstream did not answer in time.
    #[error("upstream request timed out: {0}")]
    UpstreamTimeout(String),

    /// The upstream could not be reached.
    #[error("upstream connection failed: {0}")]
    UpstreamConnect(String),

    /// Any other transport-level failure talking to the upstream.
    #[error("upstream request failed: {0}")]
    UpstreamTransport(String),

    /// The upstream answered with something that is not JSON.
    #[error("upstream returned a non-JSON body: {0}")]
    UpstreamJson(#[source] serde_json::Error),
}

impl RelayError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::RequestBody(_) => "request_body",
            RelayError::RequestJson(_) => "request_json",
            RelayError::UpstreamTimeout(_) => "upstream_timeout",
            RelayError::UpstreamConnect(_) => "upstream_connect",
            RelayError::UpstreamTransport(_) => "upstream_transport",
            RelayError::UpstreamJson(_) => "upstream_json",
        }
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        let message = error_chain(&err);
        if err.is_timeout() {
            RelayError::UpstreamTimeout(message)
        } else if err.is_connect() {
            RelayError::UpstreamConnect(message)
        } else {
            RelayError::UpstreamTransport(message)
        }
    }
}

/// Errors building the upstream client at startup.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("upstream bearer token missing; set {0}")]
    MissingToken(String),

    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Render an error with its whole source chain, skipping causes whose text
/// is already part of the message.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
