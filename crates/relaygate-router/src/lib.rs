// SPDX-FileCopyrightText: 2026 Relaygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model routing for the Relaygate gateway.
//!
//! Provides [`ModelRouter`], the per-user temporary model override store
//! with TTL expiry that decides which model variant a relayed message uses.

pub mod router;

pub use router::{ModelRouter, ModelSelection, OVERRIDE_DURATION_HOURS, override_duration};
