//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → handed to the HTTP server and upstream client at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - The upstream bearer token comes from the environment, never from source

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AuditConfig, AuditFormat, AuditRotation, ListenerConfig, LogFormat, ObservabilityConfig,
    RelayConfig, SecurityConfig, TimeoutConfig, UpstreamConfig, ANALYZE_ALIAS_PATH,
};
