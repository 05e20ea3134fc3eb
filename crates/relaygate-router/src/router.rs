// SPDX-FileCopyrightText: 2026 Relaygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user temporary model overrides with time-based expiry.
//!
//! An override substitutes a user's preferred model for the configured
//! default for a fixed duration. Expired overrides are purged lazily on
//! access with a full-store scan; there is no sweep task. The store is
//! process-lifetime only.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use relaygate_core::UserId;
use tracing::{debug, info};

/// Fixed override lifetime in hours.
pub const OVERRIDE_DURATION_HOURS: i64 = 1;

/// Returns the standard override lifetime.
pub fn override_duration() -> Duration {
    Duration::hours(OVERRIDE_DURATION_HOURS)
}

/// A user's temporary model substitution.
#[derive(Debug, Clone)]
struct ModelOverride {
    model: String,
    expires_at: DateTime<Utc>,
}

/// Which model is currently active for a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSelection {
    /// A temporary override is active.
    Temporary {
        model: String,
        /// Time until the override expires. Always positive.
        remaining: Duration,
    },
    /// The configured default model is active (permanent).
    Default { model: String },
}

impl ModelSelection {
    pub fn is_temporary(&self) -> bool {
        matches!(self, ModelSelection::Temporary { .. })
    }

    pub fn model(&self) -> &str {
        match self {
            ModelSelection::Temporary { model, .. } | ModelSelection::Default { model } => model,
        }
    }
}

/// Resolves the effective model per user: an unexpired override if one
/// exists, otherwise the configured default.
///
/// Model name validity against the allow-list is enforced by the caller
/// before [`set_override`](ModelRouter::set_override); the router stores
/// whatever it is given.
#[derive(Debug)]
pub struct ModelRouter {
    default_model: String,
    overrides: HashMap<UserId, ModelOverride>,
}

impl ModelRouter {
    pub fn new(default_model: impl Into<String>) -> Self {
        Self {
            default_model: default_model.into(),
            overrides: HashMap::new(),
        }
    }

    /// The configured default model identifier.
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Insert or replace the override for `user`, expiring after `duration`.
    pub fn set_override(
        &mut self,
        user: &UserId,
        model: impl Into<String>,
        duration: Duration,
        now: DateTime<Utc>,
    ) {
        let model = model.into();
        let expires_at = now + duration;
        info!(
            user = %user.as_str(),
            model = %model,
            expires_at = %expires_at,
            "model override set"
        );
        self.overrides
            .insert(user.clone(), ModelOverride { model, expires_at });
    }

    /// The effective model for `user` at `now`.
    ///
    /// Purges every expired override across all users first, then returns
    /// the user's override model if one survives, else the default.
    pub fn resolve(&mut self, user: &UserId, now: DateTime<Utc>) -> String {
        self.purge_expired(now);
        self.overrides
            .get(user)
            .map(|o| o.model.clone())
            .unwrap_or_else(|| self.default_model.clone())
    }

    /// Describe the active selection for `user` at `now`: the override with
    /// its remaining lifetime, or the permanent default.
    pub fn describe(&mut self, user: &UserId, now: DateTime<Utc>) -> ModelSelection {
        self.purge_expired(now);
        match self.overrides.get(user) {
            Some(o) => ModelSelection::Temporary {
                model: o.model.clone(),
                remaining: o.expires_at - now,
            },
            None => ModelSelection::Default {
                model: self.default_model.clone(),
            },
        }
    }

    /// Drop every override whose expiry has passed. An override is expired
    /// at exactly `expires_at` (boundary-inclusive).
    fn purge_expired(&mut self, now: DateTime<Utc>) {
        let before = self.overrides.len();
        self.overrides.retain(|_, o| now < o.expires_at);
        let purged = before - self.overrides.len();
        if purged > 0 {
            debug!(purged, "expired model overrides removed");
        }
    }
}
