//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check cross-field constraints (request timeout outlives a reload)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),

    #[error("store.root must not be empty")]
    EmptyRoot,

    #[error("store.suffix '{0}' must start with '.' and contain no separators")]
    Suffix(String),

    #[error("apply.command must name a program")]
    EmptyCommand,

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("timeouts.request_secs ({request}) must exceed apply.timeout_secs ({apply})")]
    RequestShorterThanApply { request: u64, apply: u64 },
}

pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.store.root.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyRoot);
    }

    let suffix = &config.store.suffix;
    if suffix.len() < 2 || !suffix.starts_with('.') || suffix.contains(['/', '\\', '\0']) {
        errors.push(ValidationError::Suffix(suffix.clone()));
    }

    if config.apply.command.first().map_or(true, |p| p.trim().is_empty()) {
        errors.push(ValidationError::EmptyCommand);
    }

    if config.apply.timeout_secs == 0 {
        errors.push(ValidationError::Zero("apply.timeout_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero("security.max_body_size"));
    }

    if config.apply.timeout_secs > 0
        && config.timeouts.request_secs > 0
        && config.timeouts.request_secs <= config.apply.timeout_secs
    {
        errors.push(ValidationError::RequestShorterThanApply {
            request: config.timeouts.request_secs,
            apply: config.apply.timeout_secs,
        });
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

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(validate_config(&ServiceConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ServiceConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.store.suffix = "conf".into();
        config.apply.command.clear();
        config.security.max_body_size = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::EmptyCommand));
        assert!(errors.contains(&ValidationError::Suffix("conf".into())));
    }

    #[test]
    fn test_request_timeout_must_outlive_reload() {
        let mut config = ServiceConfig::default();
        config.apply.timeout_secs = 120;
        config.timeouts.request_secs = 60;

        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::RequestShorterThanApply {
                request: 60,
                apply: 120
            }])
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = ServiceConfig::default();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::MetricsAddress("bogus".into())])
        );
    }
}
