//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request-id and trace layers)
//!     → request.rs (snapshot metadata, read JSON body)
//!     → upstream client (forward, await reply)
//!     → audit logger (one record)
//!     → response.rs (upstream reply or 500 payload)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod user_agent;

pub use request::{InboundView, UuidRequestId, X_FORWARDED_FOR, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
pub use user_agent::UserAgent;
