//! HTTP client for the inference API.
//!
//! # Responsibilities
//! - POST the inbound JSON value, unmodified, to the model endpoint
//! - Attach the bearer credential
//! - Return the upstream status and JSON body verbatim, errors included
//!
//! Nothing is retried.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::upstream::types::{ClientError, RelayError, Secret, UpstreamReply};

/// Relays JSON payloads to a single fixed model endpoint.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    endpoint: String,
    token: Secret,
}

impl UpstreamClient {
    /// Build a client from configuration.
    ///
    /// Fails if the bearer token was never provided.
    pub fn new(upstream: &UpstreamConfig, timeouts: &TimeoutConfig) -> Result<Self, ClientError> {
        let token = upstream
            .token
            .clone()
            .ok_or_else(|| ClientError::MissingToken(upstream.token_env.clone()))?;

        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs));
        if timeouts.request_secs > 0 {
            builder = builder.timeout(Duration::from_secs(timeouts.request_secs));
        }

        let endpoint = upstream.endpoint();
        tracing::info!(
            endpoint = %endpoint,
            connect_timeout_secs = timeouts.connect_secs,
            request_timeout_secs = timeouts.request_secs,
            "Upstream client initialized"
        );

        Ok(Self {
            http: builder.build()?,
            endpoint,
            token,
        })
    }

    /// The URL payloads are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Forward `payload` and wait for the upstream's answer.
    ///
    /// Upstream 4xx/5xx statuses are a successful relay; only transport
    /// failures and non-JSON bodies are errors.
    pub async fn forward(&self, payload: &Value) -> Result<UpstreamReply, RelayError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.token.expose())
            .header(CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        let body = serde_json::from_slice(&bytes).map_err(RelayError::UpstreamJson)?;

        tracing::debug!(
            endpoint = %self.endpoint,
            status = status.as_u16(),
            "Upstream responded"
        );

        Ok(UpstreamReply { status, body })
    }
}
