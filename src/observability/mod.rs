//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Relay handler produces:
//!     → audit.rs (one structured record per request, append-only sink)
//!     → logging.rs (operational log events via tracing)
//!     → metrics.rs (counters, histograms; optional exporter)
//! ```
//!
//! # Design Decisions
//! - Audit records and operational logs are separate streams
//! - Request ID flows from the request-id layer into both

pub mod audit;
pub mod logging;
pub mod metrics;

pub use audit::{AuditEntry, AuditError, AuditLogger, AuditSink, FileSink, MemorySink};
