// SPDX-FileCopyrightText: 2026 Relaygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Relaygate message gateway.

use thiserror::Error;

/// The primary error type used across Relaygate crates.
#[derive(Debug, Error)]
pub enum RelaygateError {
    /// Configuration errors (missing API key, invalid TOML, placeholder values).
    #[error("configuration error: {0}")]
    Config(String),

    /// LLM provider errors (HTTP failure, non-success status, malformed response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Presentation surface errors (failure delivering a reply to the platform).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
