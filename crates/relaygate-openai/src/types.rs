// SPDX-FileCopyrightText: 2026 Relaygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI Chat Completions request/response types.
//!
//! Request construction applies model-dependent parameter shaping: some
//! model families reject a caller-supplied temperature, and the
//! next-generation family names its token ceiling differently.

use relaygate_core::TokenUsage;
use serde::{Deserialize, Serialize};

/// Model identifier prefix for the next-generation family, which takes
/// `max_completion_tokens` instead of the legacy `max_tokens`.
pub const NEXT_GEN_MODEL_PREFIX: &str = "gpt-5";

/// A single chat message in the OpenAI conversation format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user", or "assistant".
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A request to the Chat Completions API.
///
/// Built through [`ChatRequest::new`] so the parameter shaping rules cannot
/// be bypassed.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,

    pub messages: Vec<ChatMessage>,

    /// Legacy token ceiling parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Token ceiling parameter for the next-generation model family.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,

    /// Sampling temperature. Omitted entirely for fixed-temperature models.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl ChatRequest {
    /// Build a request with model-dependent parameter shaping:
    /// - `temperature` is omitted when the model identifier contains any of
    ///   the fixed-temperature markers (substring match)
    /// - models prefixed with [`NEXT_GEN_MODEL_PREFIX`] carry the ceiling as
    ///   `max_completion_tokens`, all others as `max_tokens`
    pub fn new(
        model: impl Into<String>,
        messages: Vec<ChatMessage>,
        max_tokens: u32,
        temperature: f64,
        fixed_temperature_markers: &[String],
    ) -> Self {
        let model = model.into();

        let fixed_temperature = fixed_temperature_markers
            .iter()
            .any(|marker| model.contains(marker.as_str()));

        let (legacy_ceiling, next_gen_ceiling) = if model.starts_with(NEXT_GEN_MODEL_PREFIX) {
            (None, Some(max_tokens))
        } else {
            (Some(max_tokens), None)
        };

        Self {
            model,
            messages,
            max_tokens: legacy_ceiling,
            max_completion_tokens: next_gen_ceiling,
            temperature: (!fixed_temperature).then_some(temperature),
        }
    }
}

/// A response from the Chat Completions API.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<ApiUsage>,
    /// Unix timestamp of response creation, if the provider reports one.
    #[serde(default)]
    pub created: Option<i64>,
}

/// One completion choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The message payload of a choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Token accounting as reported on the wire.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ApiUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl From<ApiUsage> for TokenUsage {
    fn from(u: ApiUsage) -> Self {
        Self {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }
    }
}
