// SPDX-FileCopyrightText: 2026 Relaygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./relaygate.toml` > `~/.config/relaygate/relaygate.toml`
//! > `/etc/relaygate/relaygate.toml` with environment variable overrides via
//! `RELAYGATE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::RelaygateConfig;

/// Candidate config files in the XDG hierarchy, lowest precedence first.
fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/relaygate/relaygate.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("relaygate/relaygate.toml"));
    }
    paths.push(PathBuf::from("relaygate.toml"));
    paths
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier): compiled defaults, then each file
/// from [`config_paths`] in order, then `RELAYGATE_*` environment variables.
pub fn load_config() -> Result<RelaygateConfig, figment::Error> {
    let mut figment = Figment::new().merge(Serialized::defaults(RelaygateConfig::default()));
    for path in config_paths() {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env_provider()).extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<RelaygateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RelaygateConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides,
/// bypassing the XDG hierarchy.
pub fn load_config_from_path(path: &Path) -> Result<RelaygateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RelaygateConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Contents of every hierarchy file that exists, keyed by the same path
/// strings figment records, for diagnostic span resolution.
pub fn read_toml_sources() -> Vec<(String, String)> {
    config_paths()
        .into_iter()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|text| (path.display().to_string(), text))
        })
        .collect()
}

/// Contents of one explicit config file, in the same shape as
/// [`read_toml_sources`]. Empty when the file cannot be read.
pub fn read_source(path: &Path) -> Vec<(String, String)> {
    std::fs::read_to_string(path)
        .ok()
        .map(|text| vec![(path.display().to_string(), text)])
        .unwrap_or_default()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `RELAYGATE_OPENAI_API_KEY` must map to
/// `openai.api_key`, not `openai.api.key`.
fn env_provider() -> Env {
    Env::prefixed("RELAYGATE_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: RELAYGATE_OPENAI_API_KEY -> "openai_api_key"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("gateway_", "gateway.", 1)
            .replacen("openai_", "openai.", 1)
            .replacen("filter_", "filter.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
[openai]
default_model = "gpt-4o"
max_tokens = 256

[filter]
max_tokens_per_hour = 5000
"#,
        )
        .unwrap();
        assert_eq!(config.openai.default_model, "gpt-4o");
        assert_eq!(config.openai.max_tokens, 256);
        assert_eq!(config.filter.max_tokens_per_hour, 5000);
        // Untouched sections keep their defaults.
        assert_eq!(config.gateway.name, "relaygate");
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(
            config.openai.endpoint,
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn explicit_path_load_reads_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relaygate.toml");
        std::fs::write(&path, "[gateway]\nname = \"from-file\"\n").unwrap();

        let config = load_config_from_path(&path).unwrap();
        assert_eq!(config.gateway.name, "from-file");
        // And the source reader records the same path string.
        let sources = read_source(&path);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].0, path.display().to_string());
    }

    #[test]
    fn missing_explicit_path_yields_no_sources() {
        assert!(read_source(Path::new("/nonexistent/relaygate.toml")).is_empty());
    }
}
