// SPDX-FileCopyrightText: 2026 Relaygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability check against caller identity and role membership.

use relaygate_core::Author;
use tracing::debug;

/// Decides whether a caller may use the relay, based on administrative
/// capability, role membership, or premium status.
#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    /// Authorized role names, stored lowercase.
    authorized_roles: Vec<String>,
}

impl AuthorizationGate {
    /// Create a gate with the given authorized role names (case-insensitive).
    pub fn new(authorized_roles: &[String]) -> Self {
        Self {
            authorized_roles: authorized_roles.iter().map(|r| r.to_lowercase()).collect(),
        }
    }

    /// Returns `true` if the author holds an administrative capability, any
    /// role on the allow-list (case-insensitive exact match), or a premium
    /// membership marker.
    pub fn is_authorized(&self, author: &Author) -> bool {
        if author.is_admin {
            return true;
        }

        if author
            .roles
            .iter()
            .any(|role| self.authorized_roles.contains(&role.to_lowercase()))
        {
            return true;
        }

        if author.premium_since.is_some() {
            return true;
        }

        debug!(user = %author.id.as_str(), "author holds no authorizing capability");
        false
    }

    /// Add a role to the allow-list (case-insensitive, idempotent).
    pub fn add_authorized_role(&mut self, role: &str) {
        let role = role.to_lowercase();
        if !self.authorized_roles.contains(&role) {
            self.authorized_roles.push(role);
        }
    }

    /// Remove a role from the allow-list (case-insensitive).
    pub fn remove_authorized_role(&mut self, role: &str) {
        let role = role.to_lowercase();
        self.authorized_roles.retain(|r| *r != role);
    }
}
