//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate URLs and value ranges (timeouts > 0, confirmation ordering)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DeployConfig → Result<(), Vec<ValidationError>>
//! - Runs before any network access

use std::fmt;

use crate::config::schema::DeployConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
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

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &DeployConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = url::Url::parse(&config.network.rpc_url) {
        errors.push(ValidationError::new(
            "network.rpc_url",
            format!("invalid URL '{}': {}", config.network.rpc_url, e),
        ));
    }
    if config.network.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("network.rpc_timeout_secs", "must be greater than 0"));
    }
    if config.network.poll_interval_ms == 0 {
        errors.push(ValidationError::new("network.poll_interval_ms", "must be greater than 0"));
    }

    let deployment = &config.deployment;
    if deployment.contract.trim().is_empty() {
        errors.push(ValidationError::new("deployment.contract", "must not be empty"));
    }
    if deployment.receipt_confirmations == 0 {
        errors.push(ValidationError::new(
            "deployment.receipt_confirmations",
            "must be at least 1",
        ));
    }
    if deployment.final_confirmations < deployment.receipt_confirmations {
        errors.push(ValidationError::new(
            "deployment.final_confirmations",
            format!(
                "must be >= receipt_confirmations ({})",
                deployment.receipt_confirmations
            ),
        ));
    }
    if deployment.wait_timeout_secs == Some(0) {
        errors.push(ValidationError::new(
            "deployment.wait_timeout_secs",
            "must be greater than 0 when set",
        ));
    }

    // Explorer settings only matter when verification will run.
    let verification = &config.verification;
    if verification.enabled {
        if let Err(e) = url::Url::parse(&verification.api_url) {
            errors.push(ValidationError::new(
                "verification.api_url",
                format!("invalid URL '{}': {}", verification.api_url, e),
            ));
        }
        if verification.api_key_env.trim().is_empty() {
            errors.push(ValidationError::new("verification.api_key_env", "must not be empty"));
        }
        if verification.poll_interval_ms == 0 {
            errors.push(ValidationError::new(
                "verification.poll_interval_ms",
                "must be greater than 0",
            ));
        }
        if verification.max_status_checks == 0 {
            errors.push(ValidationError::new(
                "verification.max_status_checks",
                "must be at least 1",
            ));
        }
        if verification.request_timeout_secs == 0 {
            errors.push(ValidationError::new(
                "verification.request_timeout_secs",
                "must be greater than 0",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
