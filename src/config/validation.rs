//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the backend base address is present and well formed
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream.base_url is not set")]
    MissingBackend,

    #[error("upstream.base_url is invalid: {0}")]
    InvalidBackend(String),

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = validate_base_url(&config.upstream.base_url) {
        errors.push(e);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.upstream_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }
    if config.upstream.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroValue("upstream.max_body_bytes"));
    }
    if config.cache.enabled && config.cache.max_entries == 0 {
        errors.push(ValidationError::ZeroValue("cache.max_entries"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// The backend address must be `scheme://host[:port]` with nothing after it.
fn validate_base_url(raw: &str) -> Result<(), ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::MissingBackend);
    }

    let url = Url::parse(raw).map_err(|e| ValidationError::InvalidBackend(e.to_string()))?;

    if url.scheme() != "http" {
        return Err(ValidationError::InvalidBackend(format!(
            "unsupported scheme '{}'",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(ValidationError::InvalidBackend("missing host".to_string()));
    }
    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(ValidationError::InvalidBackend(
            "must not contain a path, query or fragment".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.upstream.base_url = "http://127.0.0.1:3000".into();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());

        let mut config = valid_config();
        config.upstream.base_url = "http://tracker.example.com/".into();
        assert!(validate_config(&config).is_ok());

        config.upstream.base_url = "https://tracker.example.com".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_missing_backend() {
        let errors = validate_config(&GatewayConfig::default()).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MissingBackend]);

        let mut config = valid_config();
        config.upstream.base_url = "   ".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_backend_with_path_rejected() {
        let mut config = valid_config();
        config.upstream.base_url = "http://127.0.0.1:3000/api".into();
        assert!(matches!(
            validate_config(&config).unwrap_err()[0],
            ValidationError::InvalidBackend(_)
        ));

        config.upstream.base_url = "ftp://127.0.0.1".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_all_errors_reported() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.timeouts.upstream_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::ZeroValue("timeouts.upstream_secs")));
    }
}
