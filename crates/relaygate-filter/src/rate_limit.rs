// SPDX-FileCopyrightText: 2026 Relaygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dual sliding-window rate limiting: message count per rolling minute and
//! token spend per hour window.
//!
//! Admission is optimistic: a message's window slot is reserved with a zero
//! token cost before the relay runs, and [`RateLimiter::report_tokens`]
//! rewrites the slot once the provider reports real usage. A relay that
//! fails after admission leaves its slot at zero tokens; the under-count is
//! accepted rather than rolled back.
//!
//! All windows are checked lazily on access. There is no background timer.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use relaygate_core::{RateLimitStatus, UserId};
use serde::Serialize;
use tracing::{debug, info};

/// Length of the message-count window.
const MESSAGE_WINDOW_SECS: i64 = 60;

/// Length of the token-spend window.
const TOKEN_WINDOW_SECS: i64 = 3600;

/// Per-user rate state, created lazily on first contact.
#[derive(Debug, Clone)]
struct UserRateState {
    /// Ordered (timestamp, token count) pairs within the last 60 seconds.
    recent: Vec<(DateTime<Utc>, u32)>,
    /// Tokens spent in the current hour window.
    tokens_this_hour: u32,
    /// Start of the current hour window.
    hour_window_start: DateTime<Utc>,
}

impl UserRateState {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            recent: Vec::new(),
            tokens_this_hour: 0,
            hour_window_start: now,
        }
    }
}

/// Read-only usage projection for one user.
#[derive(Debug, Clone, Serialize)]
pub struct UserUsageStats {
    pub messages_this_minute: usize,
    pub tokens_this_hour: u32,
    /// Messages still retained in the window buffer.
    pub total_messages: usize,
    /// Token sum over the retained window buffer.
    pub total_tokens: u32,
    pub status: RateLimitStatus,
    pub max_messages_per_minute: usize,
    pub max_tokens_per_hour: u32,
}

/// Sliding-window rate limiter keyed by user, enforcing both a per-minute
/// message ceiling and a per-hour token ceiling.
#[derive(Debug)]
pub struct RateLimiter {
    users: HashMap<UserId, UserRateState>,
    max_messages_per_minute: usize,
    max_tokens_per_hour: u32,
}

impl RateLimiter {
    pub fn new(max_messages_per_minute: usize, max_tokens_per_hour: u32) -> Self {
        Self {
            users: HashMap::new(),
            max_messages_per_minute,
            max_tokens_per_hour,
        }
    }

    /// Check both ceilings for `user` and, when neither is hit, count the
    /// message against the window. Returns `true` if the user is rate
    /// limited (nothing is counted in that case).
    ///
    /// The admitted slot carries a zero token cost until
    /// [`report_tokens`](Self::report_tokens) overwrites it.
    pub fn check_and_admit(&mut self, user: &UserId, now: DateTime<Utc>) -> bool {
        let state = self
            .users
            .entry(user.clone())
            .or_insert_with(|| UserRateState::new(now));

        // Lazy hourly token reset, at most once per elapsed hour window.
        if now - state.hour_window_start >= Duration::seconds(TOKEN_WINDOW_SECS) {
            state.tokens_this_hour = 0;
            state.hour_window_start = now;
        }

        // Drop window entries older than one minute.
        state
            .recent
            .retain(|(ts, _)| now - *ts < Duration::seconds(MESSAGE_WINDOW_SECS));

        if state.recent.len() >= self.max_messages_per_minute {
            info!(
                user = %user.as_str(),
                messages = state.recent.len(),
                ceiling = self.max_messages_per_minute,
                "user rate limited by message count"
            );
            return true;
        }

        if state.tokens_this_hour >= self.max_tokens_per_hour {
            info!(
                user = %user.as_str(),
                tokens = state.tokens_this_hour,
                ceiling = self.max_tokens_per_hour,
                "user rate limited by token spend"
            );
            return true;
        }

        // Optimistic admission: reserve the slot now, price it later.
        state.recent.push((now, 0));
        false
    }

    /// Record the real token cost of the most recently admitted message and
    /// charge it against the hour window. Called after a successful relay.
    pub fn report_tokens(&mut self, user: &UserId, token_count: u32) {
        if let Some(state) = self.users.get_mut(user) {
            if let Some(last) = state.recent.last_mut() {
                last.1 = token_count;
            }
            state.tokens_this_hour += token_count;
            debug!(user = %user.as_str(), token_count, "token usage recorded");
        }
    }

    /// Read-only usage projection for `user`. Recomputes the minute-window
    /// pruning without mutating stored state.
    pub fn stats(&self, user: &UserId, now: DateTime<Utc>) -> UserUsageStats {
        let Some(state) = self.users.get(user) else {
            return UserUsageStats {
                messages_this_minute: 0,
                tokens_this_hour: 0,
                total_messages: 0,
                total_tokens: 0,
                status: RateLimitStatus::Ok,
                max_messages_per_minute: self.max_messages_per_minute,
                max_tokens_per_hour: self.max_tokens_per_hour,
            };
        };

        let messages_this_minute = state
            .recent
            .iter()
            .filter(|(ts, _)| now - *ts < Duration::seconds(MESSAGE_WINDOW_SECS))
            .count();
        let total_tokens = state.recent.iter().map(|(_, tokens)| tokens).sum();

        let status = if messages_this_minute >= self.max_messages_per_minute {
            RateLimitStatus::MessageRateLimited
        } else if state.tokens_this_hour >= self.max_tokens_per_hour {
            RateLimitStatus::TokenRateLimited
        } else {
            RateLimitStatus::Ok
        };

        UserUsageStats {
            messages_this_minute,
            tokens_this_hour: state.tokens_this_hour,
            total_messages: state.recent.len(),
            total_tokens,
            status,
            max_messages_per_minute: self.max_messages_per_minute,
            max_tokens_per_hour: self.max_tokens_per_hour,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn user() -> UserId {
        UserId::from("user-1")
    }

    #[test]
    fn admits_up_to_message_ceiling_within_window() {
        let mut limiter = RateLimiter::new(5, 10_000);
        let u = user();

        // 5 messages within 10 seconds: all admitted.
        for i in 0..5 {
            let now = t0() + Duration::seconds(i * 2);
            assert!(!limiter.check_and_admit(&u, now), "message {i} should pass");
        }

        // 6th within the same window: rejected as message-rate-limited.
        let now = t0() + Duration::seconds(10);
        assert!(limiter.check_and_admit(&u, now));
        assert_eq!(
            limiter.stats(&u, now).status,
            RateLimitStatus::MessageRateLimited
        );

        // After a 61-second advance past the first admission, a slot frees up.
        let later = t0() + Duration::seconds(61);
        assert!(!limiter.check_and_admit(&u, later));
    }

    #[test]
    fn rejection_does_not_consume_a_slot() {
        let mut limiter = RateLimiter::new(2, 10_000);
        let u = user();
        assert!(!limiter.check_and_admit(&u, t0()));
        assert!(!limiter.check_and_admit(&u, t0() + Duration::seconds(1)));
        assert!(limiter.check_and_admit(&u, t0() + Duration::seconds(2)));
        // The rejected attempt must not have been counted.
        assert_eq!(
            limiter.stats(&u, t0() + Duration::seconds(3)).total_messages,
            2
        );
    }

    #[test]
    fn token_ceiling_blocks_until_hour_window_resets() {
        let mut limiter = RateLimiter::new(100, 1000);
        let u = user();

        assert!(!limiter.check_and_admit(&u, t0()));
        limiter.report_tokens(&u, 1000);

        // At the ceiling: every check within the hour is limited.
        let now = t0() + Duration::seconds(120);
        assert!(limiter.check_and_admit(&u, now));
        assert_eq!(
            limiter.stats(&u, now).status,
            RateLimitStatus::TokenRateLimited
        );
        assert!(limiter.check_and_admit(&u, t0() + Duration::seconds(1800)));

        // Exactly at the window boundary the counter resets and admission resumes.
        let next_window = t0() + Duration::seconds(3600);
        assert!(!limiter.check_and_admit(&u, next_window));
        assert_eq!(limiter.stats(&u, next_window).tokens_this_hour, 0);
    }

    #[test]
    fn report_tokens_prices_most_recent_slot() {
        let mut limiter = RateLimiter::new(5, 10_000);
        let u = user();

        assert!(!limiter.check_and_admit(&u, t0()));
        limiter.report_tokens(&u, 12);

        let stats = limiter.stats(&u, t0() + Duration::seconds(1));
        assert_eq!(stats.tokens_this_hour, 12);
        assert_eq!(stats.total_tokens, 12);
        assert_eq!(stats.total_messages, 1);
    }

    #[test]
    fn unreported_slot_stays_at_zero_cost() {
        let mut limiter = RateLimiter::new(5, 10_000);
        let u = user();

        // Admitted but relay never reported usage (failed call).
        assert!(!limiter.check_and_admit(&u, t0()));

        let stats = limiter.stats(&u, t0() + Duration::seconds(1));
        assert_eq!(stats.tokens_this_hour, 0);
        assert_eq!(stats.total_messages, 1);
        assert_eq!(stats.total_tokens, 0);
    }

    #[test]
    fn report_tokens_for_unknown_user_is_a_no_op() {
        let mut limiter = RateLimiter::new(5, 10_000);
        limiter.report_tokens(&user(), 50);
        assert_eq!(limiter.stats(&user(), t0()).tokens_this_hour, 0);
    }

    #[test]
    fn stats_projection_does_not_mutate() {
        let mut limiter = RateLimiter::new(5, 10_000);
        let u = user();
        assert!(!limiter.check_and_admit(&u, t0()));
        limiter.report_tokens(&u, 7);

        // Reading stats far in the future prunes only in the projection.
        let far = t0() + Duration::seconds(600);
        let stats = limiter.stats(&u, far);
        assert_eq!(stats.messages_this_minute, 0);
        // Stored entry is still there until the next mutating check.
        assert_eq!(stats.total_messages, 1);
        assert_eq!(stats.total_tokens, 7);
    }

    #[test]
    fn users_are_limited_independently() {
        let mut limiter = RateLimiter::new(1, 10_000);
        let a = UserId::from("a");
        let b = UserId::from("b");

        assert!(!limiter.check_and_admit(&a, t0()));
        assert!(limiter.check_and_admit(&a, t0() + Duration::seconds(1)));
        // A separate user is unaffected.
        assert!(!limiter.check_and_admit(&b, t0() + Duration::seconds(1)));
    }
}
