//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::upstream::Secret;

/// Inbound alias route; behaves exactly like the mirrored model route.
pub const ANALYZE_ALIAS_PATH: &str = "/analyze-sentiment";

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream inference API settings.
    pub upstream: UpstreamConfig,

    /// Timeout configuration for the upstream call.
    pub timeouts: TimeoutConfig,

    /// Audit log sink settings.
    pub audit: AuditConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:80").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:80".to_string(),
        }
    }
}

/// Upstream inference API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Scheme and host of the inference API, without trailing path.
    pub base_url: String,

    /// Model identifier, e.g. "cardiffnlp/twitter-roberta-base-sentiment-latest".
    pub model: String,

    /// Name of the environment variable holding the bearer token.
    pub token_env: String,

    /// Bearer token. Normally filled from `token_env` at load time.
    #[serde(skip_serializing)]
    pub token: Option<Secret>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api-inference.huggingface.co".to_string(),
            model: "cardiffnlp/twitter-roberta-base-sentiment-latest".to_string(),
            token_env: "RELAY_UPSTREAM_TOKEN".to_string(),
            token: None,
        }
    }
}

impl UpstreamConfig {
    /// Inbound route that mirrors the upstream model path.
    pub fn model_path(&self) -> String {
        format!("/models/{}", self.model)
    }

    /// Full URL requests are forwarded to.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.model_path())
    }
}

/// Timeout configuration for the upstream call.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total time for the upstream request/response in seconds (0 = unbounded).
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            request_secs: 120,
        }
    }
}

/// How often the audit file rolls over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuditRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// On-disk layout of a single audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuditFormat {
    /// One compact JSON object per line.
    #[default]
    Json,
    /// `<asctime> - INFO - <indented json>`.
    Pretty,
}

/// Audit log sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Directory the audit file lives in.
    pub directory: String,

    /// File name prefix ("sentiment_api" -> "sentiment_api.log").
    pub file_prefix: String,

    /// File name suffix, without the dot.
    pub file_suffix: String,

    pub rotation: AuditRotation,

    pub format: AuditFormat,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            file_prefix: "sentiment_api".to_string(),
            file_suffix: "log".to_string(),
            rotation: AuditRotation::Never,
            format: AuditFormat::Json,
        }
    }
}

/// Operational log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Request hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}
