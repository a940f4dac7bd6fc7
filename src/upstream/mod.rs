//! Upstream inference API subsystem.
//!
//! # Data Flow
//! ```text
//! Parsed inbound JSON value
//!     → client.rs (POST with bearer token, optional timeouts)
//!     → UpstreamReply { status, body } or RelayError
//! ```
//!
//! # Security Constraints
//! - The bearer token comes from configuration/environment only
//! - The token is never logged or serialized

pub mod client;
pub mod types;

pub use client::UpstreamClient;
pub use types::{error_chain, ClientError, RelayError, Secret, UpstreamReply};
