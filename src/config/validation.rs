//! Configuration validation.
//!
//! Serde handles syntax; this module checks values make sense together.
//! Every problem is reported, not just the first.

use std::net::SocketAddr;

use crate::config::schema::RelayConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a loaded configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    match url::Url::parse(&config.upstream.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "upstream.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "upstream.base_url",
            format!("invalid URL '{}': {}", config.upstream.base_url, e),
        )),
    }

    let model = &config.upstream.model;
    if model.is_empty() || model.starts_with('/') || model.ends_with('/') {
        errors.push(ValidationError::new(
            "upstream.model",
            "must be non-empty without leading or trailing '/'",
        ));
    } else if model.contains(['{', '}', '*', '?', '#', ' '])
        || model.split('/').any(|seg| seg.is_empty() || seg.starts_with(':'))
    {
        // Also becomes an inbound route, so no pattern or query characters.
        errors.push(ValidationError::new(
            "upstream.model",
            format!("'{}' contains characters not allowed in a route", model),
        ));
    }

    match &config.upstream.token {
        Some(token) if !token.expose().trim().is_empty() => {}
        _ => errors.push(ValidationError::new(
            "upstream.token",
            format!("bearer token missing; set {}", config.upstream.token_env),
        )),
    }

    if config.audit.file_prefix.is_empty() {
        errors.push(ValidationError::new("audit.file_prefix", "must not be empty"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::Secret;

    fn valid_config() -> RelayConfig {
        let mut config = RelayConfig::default();
        config.upstream.token = Some(Secret::new("hf_test"));
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_token_names_env_var() {
        let mut config = valid_config();
        config.upstream.token = None;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "upstream.token");
        assert!(errors[0].message.contains("RELAY_UPSTREAM_TOKEN"));
    }

    #[test]
    fn test_reports_all_errors() {
        let mut config = valid_config();
        config.listener.bind_address = "not-an-address".into();
        config.upstream.base_url = "ftp://example.com".into();
        config.upstream.model = "/leading".into();
        config.upstream.token = Some(Secret::new("   "));

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "upstream.base_url",
                "upstream.model",
                "upstream.token"
            ]
        );
    }

    #[test]
    fn test_model_rejects_route_patterns() {
        let mut config = valid_config();
        config.upstream.model = "org/{model}".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "upstream.model");
    }

    #[test]
    fn test_model_rejects_colon_and_empty_segments() {
        for model in [":org/model", "org/:model", "org//model"] {
            let mut config = valid_config();
            config.upstream.model = model.into();
            let errors = validate_config(&config).unwrap_err();
            assert_eq!(errors[0].field, "upstream.model", "model {}", model);
        }

        // A colon inside a segment is a legal route.
        let mut config = valid_config();
        config.upstream.model = "org/model:v2".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = valid_config();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
