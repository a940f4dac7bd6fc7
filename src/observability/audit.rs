//! Per-request audit log.
//!
//! # Responsibilities
//! - Assemble one [`AuditEntry`] per inbound request, success or failure
//! - Serialize it as a single record and append it to an [`AuditSink`]
//! - Never let a sink failure reach the caller's response
//!
//! # Design Decisions
//! - The logger is a value injected into server state, not global state
//! - Sinks are append-only; each record is written with one locked write
//!   so concurrent requests never interleave inside a record
//! - Key order in the JSON record is stable and matches the struct order

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};

use crate::config::{AuditConfig, AuditFormat, AuditRotation};
use crate::http::request::InboundView;

/// Client description derived from the User-Agent header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientInfo {
    pub user_agent: String,
    pub platform: Option<String>,
    pub browser: Option<String>,
    pub version: Option<String>,
}

/// Request half of an audit record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestRecord {
    pub ip_address: Option<String>,
    pub client_info: ClientInfo,
    pub method: String,
    pub url: String,
    pub base_url: String,
    pub path: String,
    pub headers: Map<String, Value>,
    pub args: Map<String, Value>,
    pub body: Value,
    pub protocol: String,
    pub request_id: String,
    pub remote_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_ip: Option<String>,
}

/// Response half of an audit record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseRecord {
    pub status_code: u16,
    pub data: Value,
}

/// One immutable audit record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    /// When the request arrived.
    pub timestamp: DateTime<Utc>,
    pub request: RequestRecord,
    pub response: ResponseRecord,
    /// When the record was assembled.
    pub server_timestamp: DateTime<Utc>,
    /// Seconds between arrival and logging.
    pub processing_time: f64,
}

impl AuditEntry {
    /// Build an entry from the entry-time snapshot and the final outcome.
    pub fn new(view: &InboundView, request_body: &Value, response_body: &Value, status: StatusCode) -> Self {
        Self {
            timestamp: view.received_at,
            request: RequestRecord {
                ip_address: view.remote_ip.clone(),
                client_info: ClientInfo {
                    user_agent: view.user_agent.raw.clone(),
                    platform: view.user_agent.platform.clone(),
                    browser: view.user_agent.browser.clone(),
                    version: view.user_agent.version.clone(),
                },
                method: view.method.clone(),
                url: view.url.clone(),
                base_url: view.base_url.clone(),
                path: view.path.clone(),
                headers: view.headers.clone(),
                args: view.args.clone(),
                body: request_body.clone(),
                protocol: view.protocol.clone(),
                request_id: view.request_id.clone(),
                remote_port: view.remote_port,
                original_ip: view.forwarded_for.clone(),
            },
            response: ResponseRecord {
                status_code: status.as_u16(),
                data: response_body.clone(),
            },
            server_timestamp: Utc::now(),
            processing_time: view.elapsed_secs(),
        }
    }
}

/// Append-only destination for serialized audit records.
///
/// Implementations must write each record atomically with respect to
/// other callers.
pub trait AuditSink: Send + Sync {
    fn append(&self, record: &[u8]) -> io::Result<()>;
}

/// Errors opening an audit sink.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("failed to open audit log in {dir}: {source}")]
    Open {
        dir: PathBuf,
        #[source]
        source: InitError,
    },
}

/// File sink backed by a (optionally rolling) appender.
pub struct FileSink {
    writer: Mutex<RollingFileAppender>,
}

impl FileSink {
    /// Open or create the audit file described by `config`.
    pub fn open(config: &AuditConfig) -> Result<Self, AuditError> {
        let rotation = match config.rotation {
            AuditRotation::Never => Rotation::NEVER,
            AuditRotation::Hourly => Rotation::HOURLY,
            AuditRotation::Daily => Rotation::DAILY,
        };

        let appender = RollingFileAppender::builder()
            .rotation(rotation)
            .filename_prefix(config.file_prefix.as_str())
            .filename_suffix(config.file_suffix.as_str())
            .build(&config.directory)
            .map_err(|source| AuditError::Open {
                dir: PathBuf::from(&config.directory),
                source,
            })?;

        tracing::info!(
            directory = %config.directory,
            prefix = %config.file_prefix,
            rotation = ?config.rotation,
            "Audit log opened"
        );

        Ok(Self {
            writer: Mutex::new(appender),
        })
    }
}

impl AuditSink for FileSink {
    fn append(&self, record: &[u8]) -> io::Result<()> {
        let mut writer = lock(&self.writer);
        writer.write_all(record)?;
        writer.flush()
    }
}

/// In-memory sink, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw records in append order.
    pub fn records(&self) -> Vec<String> {
        lock(&self.records)
            .iter()
            .map(|r| String::from_utf8_lossy(r).into_owned())
            .collect()
    }

    /// Records parsed back into JSON. Only meaningful for the JSON format.
    pub fn entries(&self) -> Vec<Value> {
        lock(&self.records)
            .iter()
            .filter_map(|r| serde_json::from_slice(r).ok())
            .collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemorySink {
    fn append(&self, record: &[u8]) -> io::Result<()> {
        lock(&self.records).push(record.to_vec());
        Ok(())
    }
}

// A panic while holding the lock cannot leave a half-written record in
// memory, so a poisoned lock is still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Builds and writes audit records.
#[derive(Clone)]
pub struct AuditLogger {
    sink: Arc<dyn AuditSink>,
    format: AuditFormat,
}

impl AuditLogger {
    pub fn new(sink: Arc<dyn AuditSink>, format: AuditFormat) -> Self {
        Self { sink, format }
    }

    /// Logger writing to the file described by `config`.
    pub fn from_config(config: &AuditConfig) -> Result<Self, AuditError> {
        Ok(Self::new(Arc::new(FileSink::open(config)?), config.format))
    }

    /// Record one request/response pair. Failures are reported through
    /// tracing and otherwise swallowed.
    pub fn record(&self, view: &InboundView, request_body: &Value, response_body: &Value, status: StatusCode) {
        let entry = AuditEntry::new(view, request_body, response_body, status);

        let rendered = match self.render(&entry) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(request_id = %view.request_id, error = %e, "Failed to serialize audit entry");
                return;
            }
        };

        if let Err(e) = self.sink.append(&rendered) {
            tracing::error!(request_id = %view.request_id, error = %e, "Failed to write audit entry");
        }
    }

    /// Serialize an entry in the configured format, newline-terminated.
    pub fn render(&self, entry: &AuditEntry) -> Result<Vec<u8>, serde_json::Error> {
        let mut out = match self.format {
            AuditFormat::Json => serde_json::to_vec(entry)?,
            AuditFormat::Pretty => {
                let asctime = entry.server_timestamp.format("%Y-%m-%d %H:%M:%S,%3f");
                let mut out = format!("{} - INFO - ", asctime).into_bytes();
                out.extend(serde_json::to_vec_pretty(entry)?);
                out
            }
        };
        out.push(b'\n');
        Ok(out)
    }
}
