// SPDX-FileCopyrightText: 2026 Relaygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Relaygate message gateway.
//!
//! TOML files merged in XDG order with `RELAYGATE_*` environment overrides,
//! strict unknown-key rejection, post-deserialization validation that
//! collects every violation, and miette diagnostics with typo suggestions
//! when loading fails.
//!
//! # Usage
//!
//! ```no_run
//! use relaygate_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Default model: {}", config.openai.default_model);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

use diagnostic::Diagnoser;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{FilterConfig, GatewayConfig, OpenAiConfig, RelaygateConfig};

/// Load configuration from the XDG hierarchy and validate it.
pub fn load_and_validate() -> Result<RelaygateConfig, Vec<ConfigError>> {
    finish(loader::load_config(), &loader::read_toml_sources())
}

/// Load configuration from one explicit file (plus env overrides) and
/// validate it. Backs the binary's `--config` flag.
pub fn load_and_validate_path(path: &Path) -> Result<RelaygateConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), &loader::read_source(path))
}

/// Load configuration from an inline TOML string and validate it.
///
/// String loads have no backing file, so any diagnostics render without a
/// source span.
pub fn load_and_validate_str(toml_content: &str) -> Result<RelaygateConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), &[])
}

/// Shared tail of every load entry point: bridge figment errors to
/// diagnostics, then run semantic validation on a successful parse.
fn finish(
    result: Result<RelaygateConfig, figment::Error>,
    sources: &[(String, String)],
) -> Result<RelaygateConfig, Vec<ConfigError>> {
    let config = result.map_err(|err| Diagnoser::new(sources).diagnose(err))?;
    validation::validate_config(&config)?;
    Ok(config)
}
