// SPDX-FileCopyrightText: 2026 Relaygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `relaygate status` command implementation.
//!
//! Reports the effective configuration: relay state, model selection, and
//! the gating ceilings. With `--json`, emits structured output for
//! scripting.

use relaygate_config::RelaygateConfig;
use relaygate_openai::PLACEHOLDER_API_KEY;
use serde_json::json;

/// Whether the relay would issue provider calls with this configuration.
fn relay_active(config: &RelaygateConfig) -> bool {
    config.openai.enabled
        && matches!(config.openai.api_key.as_deref(), Some(key) if key != PLACEHOLDER_API_KEY)
}

/// Run the `relaygate status` command.
pub fn run_status(config: &RelaygateConfig, json: bool) {
    let active = relay_active(config);

    if json {
        let value = json!({
            "gateway": config.gateway.name,
            "relay_active": active,
            "default_model": config.openai.default_model,
            "allowed_models": config.openai.allowed_models,
            "max_messages_per_minute": config.filter.max_messages_per_minute,
            "max_tokens_per_hour": config.filter.max_tokens_per_hour,
            "authorized_roles": config.filter.authorized_roles,
            "blocked_words": config.filter.blocked_words.len(),
        });
        println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
        return;
    }

    println!("Gateway:        {}", config.gateway.name);
    println!(
        "Relay:          {}",
        if active { "active" } else { "inactive" }
    );
    println!("Default model:  {}", config.openai.default_model);
    println!(
        "Allowed models: {}",
        config.openai.allowed_models.join(", ")
    );
    println!(
        "Rate limits:    {} msg/min, {} tokens/hour",
        config.filter.max_messages_per_minute, config.filter.max_tokens_per_hour
    );
    println!(
        "Authorized:     {}",
        config.filter.authorized_roles.join(", ")
    );
    println!(
        "Blocked words:  {} configured",
        config.filter.blocked_words.len()
    );
}
