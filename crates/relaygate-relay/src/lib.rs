// SPDX-FileCopyrightText: 2026 Relaygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relay orchestration: carries an admitted message to the provider,
//! charges its real token cost back, and delivers the reply through a
//! pluggable [`PresentationSink`].

pub mod orchestrator;
pub mod sink;
pub mod usage;

pub use orchestrator::RelayOrchestrator;
pub use sink::{PresentationSink, ReplyCard};
pub use usage::{UsageSnapshot, UsageTracker};
