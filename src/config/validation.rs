//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and value ranges
//! - Detect duplicate resource controllers
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {field} address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("routes.base_path must start with '/': {0}")]
    InvalidBasePath(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("resource controller name must not be empty")]
    EmptyController,

    #[error("resource controller {0} is declared more than once")]
    DuplicateController(String),

    #[error("resource {controller} has invalid id parameter {id:?}")]
    InvalidResourceId { controller: String, id: String },
}

/// Check `config` for semantic errors.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled && config.observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if !config.routes.base_path.starts_with('/') {
        errors.push(ValidationError::InvalidBasePath(config.routes.base_path.clone()));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("listener.max_body_bytes"));
    }

    let mut seen = HashSet::new();
    for resource in &config.resources {
        if resource.controller.is_empty() {
            errors.push(ValidationError::EmptyController);
        } else if !seen.insert(resource.controller.as_str()) {
            errors.push(ValidationError::DuplicateController(resource.controller.clone()));
        }

        if resource.id.is_empty() || resource.id.contains('/') {
            errors.push(ValidationError::InvalidResourceId {
                controller: resource.controller.clone(),
                id: resource.id.clone(),
            });
        }
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
    use crate::config::schema::ResourceConfig;

    fn resource(controller: &str, id: &str) -> ResourceConfig {
        ResourceConfig {
            controller: controller.to_string(),
            id: id.to_string(),
            required: Vec::new(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "not-an-address".to_string();
        config.routes.base_path = "api".to_string();
        config.timeouts.request_secs = 0;
        config.listener.max_body_bytes = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::InvalidBasePath("api".to_string())));
        assert!(errors.contains(&ValidationError::Zero("timeouts.request_secs")));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = AppConfig::default();
        config.observability.metrics_address = "nowhere".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(validate_config(&config).unwrap_err().len(), 1);
    }

    #[test]
    fn test_resource_rules() {
        let mut config = AppConfig::default();
        config.resources = vec![
            resource("Item", "id"),
            resource("Item", "itemId"),
            resource("", "id"),
            resource("Person", "a/b"),
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::DuplicateController("Item".to_string()),
                ValidationError::EmptyController,
                ValidationError::InvalidResourceId {
                    controller: "Person".to_string(),
                    id: "a/b".to_string()
                },
            ]
        );
    }
}
