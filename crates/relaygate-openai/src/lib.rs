// SPDX-FileCopyrightText: 2026 Relaygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI Chat Completions provider client for Relaygate.
//!
//! [`OpenAiClient`] issues completion requests; [`ChatRequest::new`] applies
//! the model-dependent parameter shaping (temperature omission for
//! fixed-temperature models, `max_completion_tokens` for the
//! next-generation family).

pub mod client;
pub mod types;

pub use client::{OpenAiClient, PLACEHOLDER_API_KEY};
pub use types::{
    ApiUsage, ChatChoice, ChatMessage, ChatRequest, ChatResponse, ChoiceMessage,
    NEXT_GEN_MODEL_PREFIX,
};
