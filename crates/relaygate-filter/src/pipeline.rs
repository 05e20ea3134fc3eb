// SPDX-FileCopyrightText: 2026 Relaygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Composes the authorization, content-safety, and rate-limit gates plus the
//! metadata analysis pass into a single admission decision.
//!
//! All sub-checks run on every message regardless of earlier failures, so a
//! rejected message still carries complete diagnostics. The pipeline never
//! errors to its caller: a sub-check that cannot produce an answer degrades
//! to its most conservative outcome (unauthorized, unsafe, or limited).

use chrono::{DateTime, Utc};
use relaygate_config::FilterConfig;
use relaygate_core::{FilterDecision, InboundMessage, MessageAnalysis};
use tracing::info;

use crate::authorization::AuthorizationGate;
use crate::rate_limit::{RateLimiter, UserUsageStats};
use crate::safety::ContentSafetyGate;
use crate::sentiment::classify_sentiment;

/// Code blocks are fenced with this delimiter on the platform.
const CODE_FENCE: &str = "```";

/// The message admission pipeline.
///
/// Owns the three gates and the per-user rate state. One message is
/// evaluated at a time; the only shared mutation is the rate limiter's
/// optimistic admission.
#[derive(Debug)]
pub struct FilterPipeline {
    authorization: AuthorizationGate,
    safety: ContentSafetyGate,
    limiter: RateLimiter,
}

impl FilterPipeline {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            authorization: AuthorizationGate::new(&config.authorized_roles),
            safety: ContentSafetyGate::new(&config.blocked_words),
            limiter: RateLimiter::new(
                config.max_messages_per_minute,
                config.max_tokens_per_hour,
            ),
        }
    }

    /// Evaluate one inbound message.
    ///
    /// Runs all four sub-checks unconditionally and combines them:
    /// `should_process` requires authorization, content safety, an open rate
    /// window, and non-empty trimmed text.
    pub fn evaluate(&mut self, message: &InboundMessage, now: DateTime<Utc>) -> FilterDecision {
        let user_authorized = self.authorization.is_authorized(&message.author);
        let content_safe = self.safety.is_safe(&message.text);
        let rate_limited = self.limiter.check_and_admit(&message.author.id, now);
        let analysis = analyze_message(message);

        let should_process =
            user_authorized && content_safe && !rate_limited && !message.text.trim().is_empty();

        info!(
            user = %message.author.id.as_str(),
            should_process,
            user_authorized,
            content_safe,
            rate_limited,
            "message evaluated"
        );

        FilterDecision {
            should_process,
            user_authorized,
            content_safe,
            rate_limited,
            analysis: Some(analysis),
            timestamp: now,
        }
    }

    /// Read-only usage projection for one user.
    pub fn user_stats(&self, user: &relaygate_core::UserId, now: DateTime<Utc>) -> UserUsageStats {
        self.limiter.stats(user, now)
    }

    /// Mutable access to the rate limiter, for token cost reporting after a
    /// successful relay.
    pub fn limiter_mut(&mut self) -> &mut RateLimiter {
        &mut self.limiter
    }

    /// Add a role to the authorization allow-list at runtime.
    pub fn add_authorized_role(&mut self, role: &str) {
        self.authorization.add_authorized_role(role);
    }

    /// Remove a role from the authorization allow-list at runtime.
    pub fn remove_authorized_role(&mut self, role: &str) {
        self.authorization.remove_authorized_role(role);
    }

    /// Add a blocked word at runtime.
    pub fn add_blocked_word(&mut self, word: &str) {
        self.safety.add_blocked_word(word);
    }

    /// Remove a blocked word at runtime.
    pub fn remove_blocked_word(&mut self, word: &str) {
        self.safety.remove_blocked_word(word);
    }
}

/// The metadata analysis pass. Pure; feeds diagnostics only.
fn analyze_message(message: &InboundMessage) -> MessageAnalysis {
    let text = &message.text;
    MessageAnalysis {
        word_count: text.split_whitespace().count(),
        character_count: text.chars().count(),
        has_mentions: message.mention_count > 0,
        has_attachments: message.attachment_count > 0,
        has_embeds: message.embed_count > 0,
        channel_name: message.channel_name.clone(),
        guild_name: message.guild_name.clone(),
        is_reply: message.is_reply,
        contains_code: text.contains(CODE_FENCE),
        contains_url: text.contains("http://") || text.contains("https://"),
        sentiment: classify_sentiment(text),
    }
}
