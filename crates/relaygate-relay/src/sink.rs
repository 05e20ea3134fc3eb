// SPDX-FileCopyrightText: 2026 Relaygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The seam between the relay and the platform's presentation layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use relaygate_core::RelaygateError;

/// A formatted reply ready for platform rendering.
///
/// `temperature` is the nominal configured value, not necessarily what was
/// sent on the wire (fixed-temperature models receive none).
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyCard {
    pub response_text: String,
    /// Excerpt of the message being answered, capped at 100 characters.
    pub responding_to: String,
    pub model: String,
    pub temperature: f64,
    pub total_tokens: u32,
    /// Provider-reported creation time when present, local clock otherwise.
    pub timestamp: DateTime<Utc>,
}

/// Delivery surface for relayed replies.
///
/// Implemented by the real platform adapter and by test fixtures. The relay
/// tries [`send_card`](PresentationSink::send_card) first and falls back to
/// a truncated [`send_text`](PresentationSink::send_text) once on failure.
#[async_trait]
pub trait PresentationSink: Send + Sync {
    /// Deliver a formatted reply card.
    async fn send_card(&self, card: &ReplyCard) -> Result<(), RelaygateError>;

    /// Deliver a degraded plain-text reply.
    async fn send_text(&self, text: &str) -> Result<(), RelaygateError>;
}
