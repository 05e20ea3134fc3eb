// SPDX-FileCopyrightText: 2026 Relaygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Relaygate message gateway.
//!
//! Provides the error taxonomy and the common types shared by the filter
//! pipeline, model router, and relay orchestrator crates.

pub mod error;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::RelaygateError;
pub use types::{
    Author, FilterDecision, InboundMessage, MessageAnalysis, RateLimitStatus, Sentiment,
    TokenUsage, UserId,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_has_all_variants() {
        let _config = RelaygateError::Config("test".into());
        let _provider = RelaygateError::Provider {
            message: "test".into(),
            source: None,
        };
        let _channel = RelaygateError::Channel {
            message: "test".into(),
            source: Some(Box::new(std::io::Error::other("test"))),
        };
        let _internal = RelaygateError::Internal("test".into());
    }

    #[test]
    fn error_display_includes_message() {
        let err = RelaygateError::Provider {
            message: "API returned 500".into(),
            source: None,
        };
        assert_eq!(err.to_string(), "provider error: API returned 500");
    }
}
