// SPDX-FileCopyrightText: 2026 Relaygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session-wide usage accounting.
//!
//! Counters are monotonically increasing for the process lifetime; derived
//! rates are computed on read, never stored.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

/// Floor for the session-duration denominator, avoiding divide-by-near-zero
/// right after startup.
const MIN_SESSION_HOURS: f64 = 0.01;

/// Aggregates call and token counters for the current session.
#[derive(Debug)]
pub struct UsageTracker {
    total_tokens_used: u64,
    api_calls_made: u64,
    session_start: DateTime<Utc>,
}

/// Point-in-time usage totals with derived rates.
#[derive(Debug, Clone, Serialize)]
pub struct UsageSnapshot {
    pub total_tokens_used: u64,
    pub api_calls_made: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_hours: f64,
    pub average_tokens_per_call: f64,
    pub tokens_per_hour: f64,
}

impl UsageTracker {
    pub fn new(session_start: DateTime<Utc>) -> Self {
        Self {
            total_tokens_used: 0,
            api_calls_made: 0,
            session_start,
        }
    }

    /// Count one completed API call and its token cost.
    pub fn record(&mut self, tokens: u32) {
        self.total_tokens_used += u64::from(tokens);
        self.api_calls_made += 1;
        debug!(
            tokens,
            total = self.total_tokens_used,
            calls = self.api_calls_made,
            "usage recorded"
        );
    }

    /// Totals plus derived rates at `now`.
    pub fn snapshot(&self, now: DateTime<Utc>) -> UsageSnapshot {
        let session_duration_hours =
            (now - self.session_start).num_milliseconds() as f64 / 3_600_000.0;
        let average_tokens_per_call =
            self.total_tokens_used as f64 / (self.api_calls_made.max(1)) as f64;
        let tokens_per_hour =
            self.total_tokens_used as f64 / session_duration_hours.max(MIN_SESSION_HOURS);

        UsageSnapshot {
            total_tokens_used: self.total_tokens_used,
            api_calls_made: self.api_calls_made,
            session_start: self.session_start,
            session_duration_hours,
            average_tokens_per_call,
            tokens_per_hour,
        }
    }
}
