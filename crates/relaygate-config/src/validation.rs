// SPDX-FileCopyrightText: 2026 Relaygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as endpoint URL scheme, non-zero ceilings, and a sane
//! temperature range.

use crate::diagnostic::ConfigError;
use crate::model::RelaygateConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &RelaygateConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.openai.default_model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "openai.default_model must not be empty".to_string(),
        });
    }

    let endpoint = config.openai.endpoint.trim();
    if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("openai.endpoint `{endpoint}` must be an http(s) URL"),
        });
    }

    if config.openai.max_tokens == 0 {
        errors.push(ConfigError::Validation {
            message: "openai.max_tokens must be at least 1".to_string(),
        });
    }

    if !(0.0..=2.0).contains(&config.openai.temperature) {
        errors.push(ConfigError::Validation {
            message: format!(
                "openai.temperature must be within 0.0..=2.0, got {}",
                config.openai.temperature
            ),
        });
    }

    if config.openai.allowed_models.is_empty() {
        errors.push(ConfigError::Validation {
            message: "openai.allowed_models must list at least one model".to_string(),
        });
    }

    if config.filter.max_messages_per_minute == 0 {
        errors.push(ConfigError::Validation {
            message: "filter.max_messages_per_minute must be at least 1".to_string(),
        });
    }

    if config.filter.max_tokens_per_hour == 0 {
        errors.push(ConfigError::Validation {
            message: "filter.max_tokens_per_hour must be at least 1".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
