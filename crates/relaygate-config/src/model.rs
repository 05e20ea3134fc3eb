// SPDX-FileCopyrightText: 2026 Relaygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Relaygate message gateway.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Relaygate configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelaygateConfig {
    /// Gateway identity and logging settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// OpenAI relay settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Message filter and rate-limit settings.
    #[serde(default)]
    pub filter: FilterConfig,
}

/// Gateway identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Display name of the gateway.
    #[serde(default = "default_gateway_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            name: default_gateway_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_gateway_name() -> String {
    "relaygate".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// OpenAI relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// OpenAI API key. `None` (or the placeholder) disables the relay.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Default model for relayed completions.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Chat Completions endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Token ceiling per relayed request.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature sent for models that accept one.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Master switch for the relay integration.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Models a user may select as a temporary override.
    #[serde(default = "default_allowed_models")]
    pub allowed_models: Vec<String>,

    /// Model identifier markers (substring match) whose models reject a
    /// caller-supplied temperature; the field is omitted for these.
    #[serde(default = "default_fixed_temperature_models")]
    pub fixed_temperature_models: Vec<String>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: default_model(),
            endpoint: default_endpoint(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            enabled: default_enabled(),
            allowed_models: default_allowed_models(),
            fixed_temperature_models: default_fixed_temperature_models(),
        }
    }
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_max_tokens() -> u32 {
    500
}

fn default_temperature() -> f64 {
    0.7
}

fn default_enabled() -> bool {
    true
}

fn default_allowed_models() -> Vec<String> {
    vec![
        "gpt-4".to_string(),
        "gpt-4o".to_string(),
        "gpt-4o-mini".to_string(),
        "gpt-5".to_string(),
        "gpt-5-mini".to_string(),
        "gpt-5-nano".to_string(),
    ]
}

fn default_fixed_temperature_models() -> Vec<String> {
    vec!["gpt-5".to_string(), "o1".to_string(), "o3".to_string()]
}

/// Message filter and rate-limit configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    /// Admissions allowed per user in any rolling 60-second window.
    #[serde(default = "default_max_messages_per_minute")]
    pub max_messages_per_minute: usize,

    /// Tokens allowed per user per hour window.
    #[serde(default = "default_max_tokens_per_hour")]
    pub max_tokens_per_hour: u32,

    /// Role names (case-insensitive) authorized to use the relay.
    #[serde(default = "default_authorized_roles")]
    pub authorized_roles: Vec<String>,

    /// Substrings (case-insensitive) that make a message unsafe.
    #[serde(default = "default_blocked_words")]
    pub blocked_words: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_messages_per_minute: default_max_messages_per_minute(),
            max_tokens_per_hour: default_max_tokens_per_hour(),
            authorized_roles: default_authorized_roles(),
            blocked_words: default_blocked_words(),
        }
    }
}

fn default_max_messages_per_minute() -> usize {
    5
}

fn default_max_tokens_per_hour() -> u32 {
    10_000
}

fn default_authorized_roles() -> Vec<String> {
    vec![
        "admin".to_string(),
        "moderator".to_string(),
        "openai-user".to_string(),
        "premium".to_string(),
    ]
}

fn default_blocked_words() -> Vec<String> {
    vec![
        "spam".to_string(),
        "inappropriate".to_string(),
        "offensive".to_string(),
    ]
}
