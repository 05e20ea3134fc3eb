// SPDX-FileCopyrightText: 2026 Relaygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Relaygate crates.
//!
//! [`InboundMessage`] is the narrow view of a platform message: exactly the
//! fields the gating and relay pipeline reads, implemented by the real
//! platform adapter and by test fixtures alike.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a platform user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The author of an inbound message, with the capability metadata the
/// authorization gate inspects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: UserId,
    pub display_name: String,
    /// Role names the author holds on the platform.
    pub roles: Vec<String>,
    /// Whether the author holds an administrative capability.
    pub is_admin: bool,
    /// When the author's premium membership started, if any.
    pub premium_since: Option<DateTime<Utc>>,
}

/// An inbound message from the messaging platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub text: String,
    pub author: Author,
    pub channel_name: String,
    pub guild_name: String,
    pub mention_count: usize,
    pub attachment_count: usize,
    pub embed_count: usize,
    /// Whether the message is a reply to another message.
    pub is_reply: bool,
}

/// Heuristic sentiment label produced by the keyword classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// Per-message metadata produced by the analysis pass. Feeds diagnostics
/// only; admission does not depend on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageAnalysis {
    pub word_count: usize,
    pub character_count: usize,
    pub has_mentions: bool,
    pub has_attachments: bool,
    pub has_embeds: bool,
    pub channel_name: String,
    pub guild_name: String,
    pub is_reply: bool,
    pub contains_code: bool,
    pub contains_url: bool,
    pub sentiment: Sentiment,
}

/// The admission decision for one evaluated message. Immutable once
/// produced; owned by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterDecision {
    pub should_process: bool,
    pub user_authorized: bool,
    pub content_safe: bool,
    pub rate_limited: bool,
    pub analysis: Option<MessageAnalysis>,
    pub timestamp: DateTime<Utc>,
}

/// Rate-limit standing for a user, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum RateLimitStatus {
    #[strum(serialize = "OK")]
    #[serde(rename = "OK")]
    Ok,
    #[strum(serialize = "MESSAGE_RATE_LIMITED")]
    #[serde(rename = "MESSAGE_RATE_LIMITED")]
    MessageRateLimited,
    #[strum(serialize = "TOKEN_RATE_LIMITED")]
    #[serde(rename = "TOKEN_RATE_LIMITED")]
    TokenRateLimited,
}

/// Token counts reported by the provider for one completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
