//! Audited JSON relay for a hosted sentiment-analysis model.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod upstream;

pub use config::schema::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::{AuditLogger, MemorySink};
