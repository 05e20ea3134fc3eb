// SPDX-FileCopyrightText: 2026 Relaygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message admission pipeline for the Relaygate gateway.
//!
//! This crate decides, per inbound message, whether it may be relayed to
//! the LLM provider:
//! - [`AuthorizationGate`]: capability check against caller identity
//! - [`ContentSafetyGate`]: lexical/structural checks on raw text
//! - [`RateLimiter`]: dual sliding-window enforcement (messages/minute and
//!   tokens/hour) with optimistic admission
//! - [`FilterPipeline`]: composes the gates plus a metadata analysis pass
//!   into one [`FilterDecision`](relaygate_core::FilterDecision)

pub mod authorization;
pub mod pipeline;
pub mod rate_limit;
pub mod safety;
pub mod sentiment;

pub use authorization::AuthorizationGate;
pub use pipeline::FilterPipeline;
pub use rate_limit::{RateLimiter, UserUsageStats};
pub use safety::ContentSafetyGate;
pub use sentiment::classify_sentiment;
