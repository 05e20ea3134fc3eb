// SPDX-FileCopyrightText: 2026 Relaygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end relay of an admitted message to the provider and back.
//!
//! The orchestrator resolves the effective model, issues the completion
//! call, charges the real token cost back to the rate limiter (closing the
//! optimistic-admission gap) and the session tracker, then hands the
//! formatted reply to the presentation sink. No failure inside
//! [`RelayOrchestrator::relay`] reaches the caller; the worst case is a
//! missing or degraded reply plus a log record.

use chrono::{DateTime, TimeZone, Utc};
use relaygate_config::OpenAiConfig;
use relaygate_core::{FilterDecision, InboundMessage, RelaygateError, TokenUsage, UserId};
use relaygate_filter::RateLimiter;
use relaygate_openai::{ChatMessage, ChatRequest, OpenAiClient, PLACEHOLDER_API_KEY};
use relaygate_router::{ModelRouter, ModelSelection, override_duration};
use tracing::{debug, error, info, warn};

use crate::sink::{PresentationSink, ReplyCard};
use crate::usage::{UsageSnapshot, UsageTracker};

/// Character cap for the "responding to" excerpt.
const EXCERPT_LEN: usize = 100;

/// Character cap for the degraded plain-text fallback reply.
const FALLBACK_LEN: usize = 1500;

/// Relays admitted messages to the Chat Completions API.
pub struct RelayOrchestrator<S: PresentationSink> {
    config: OpenAiConfig,
    /// `None` when the integration is disabled or the key is unconfigured.
    client: Option<OpenAiClient>,
    router: ModelRouter,
    usage: UsageTracker,
    sink: S,
}

impl<S: PresentationSink> RelayOrchestrator<S> {
    /// Build the orchestrator. A disabled integration or a missing or
    /// placeholder API key leaves the relay inert: every call becomes a
    /// logged no-op rather than an error.
    pub fn new(config: OpenAiConfig, sink: S, session_start: DateTime<Utc>) -> Self {
        let client = if !config.enabled {
            info!("relay integration disabled via configuration");
            None
        } else {
            match config.api_key.as_deref() {
                None | Some(PLACEHOLDER_API_KEY) => {
                    error!("API key not configured, relay will not run");
                    None
                }
                Some(key) => match OpenAiClient::new(key, config.endpoint.clone()) {
                    Ok(client) => Some(client),
                    Err(e) => {
                        error!(error = %e, "failed to build provider client");
                        None
                    }
                },
            }
        };

        Self {
            router: ModelRouter::new(config.default_model.clone()),
            usage: UsageTracker::new(session_start),
            config,
            client,
            sink,
        }
    }

    /// Whether the relay is configured and able to issue provider calls.
    pub fn is_active(&self) -> bool {
        self.client.is_some()
    }

    /// Relay one admitted message.
    ///
    /// No-op when the integration is inactive or the decision rejected the
    /// message. On success, token usage is reported to `limiter` for the
    /// message's author and counted in the session tracker. A message
    /// admitted here whose relay fails keeps its zero-cost window slot.
    pub async fn relay(
        &mut self,
        message: &InboundMessage,
        decision: &FilterDecision,
        limiter: &mut RateLimiter,
        now: DateTime<Utc>,
    ) {
        info!(
            user = %message.author.display_name,
            text = %excerpt(&message.text, EXCERPT_LEN),
            "relay requested"
        );

        let Some(client) = self.client.as_ref() else {
            debug!("relay inactive, skipping message");
            return;
        };

        if !decision.should_process {
            info!(
                authorized = decision.user_authorized,
                safe = decision.content_safe,
                rate_limited = decision.rate_limited,
                "message filtered out, not relaying"
            );
            return;
        }

        let model = self.router.resolve(&message.author.id, now);
        let request = ChatRequest::new(
            model.clone(),
            build_prompt(message),
            self.config.max_tokens,
            self.config.temperature,
            &self.config.fixed_temperature_models,
        );

        let response = match client.complete(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, model = %model, "provider call failed, dropping relay");
                return;
            }
        };

        let Some(choice) = response.choices.first() else {
            warn!("no choices in provider response, dropping relay");
            return;
        };
        let finish_reason = choice.finish_reason.as_deref().unwrap_or("unknown");
        let response_text = choice.message.content.clone().unwrap_or_default();

        let usage: TokenUsage = response.usage.unwrap_or_default().into();
        self.usage.record(usage.total_tokens);
        limiter.report_tokens(&message.author.id, usage.total_tokens);

        info!(
            finish_reason,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            "provider response processed"
        );

        if response_text.is_empty() {
            warn!("empty response content from provider");
            return;
        }

        // Provider-reported creation time when present, local clock otherwise.
        let timestamp = response
            .created
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .unwrap_or(now);

        let card = ReplyCard {
            response_text,
            responding_to: excerpt(&message.text, EXCERPT_LEN),
            model,
            temperature: self.config.temperature,
            total_tokens: usage.total_tokens,
            timestamp,
        };

        self.deliver(card).await;
    }

    /// Deliver the reply card, degrading to a truncated plain-text reply on
    /// failure. A second failure is logged and swallowed.
    async fn deliver(&self, card: ReplyCard) {
        if let Err(e) = self.sink.send_card(&card).await {
            warn!(error = %e, "card delivery failed, attempting plain-text fallback");
            let fallback = excerpt(&card.response_text, FALLBACK_LEN);
            if let Err(e) = self.sink.send_text(&fallback).await {
                error!(error = %e, "fallback delivery failed, reply dropped");
            }
        }
    }

    /// Set a temporary model override for `user`, valid for one hour.
    ///
    /// The model must be on the configured allow-list; the router itself
    /// does not validate.
    pub fn set_model_override(
        &mut self,
        user: &UserId,
        model: &str,
        now: DateTime<Utc>,
    ) -> Result<(), RelaygateError> {
        if !self.config.allowed_models.iter().any(|m| m == model) {
            return Err(RelaygateError::Config(format!(
                "model `{model}` is not on the allow-list ({})",
                self.config.allowed_models.join(", ")
            )));
        }
        self.router
            .set_override(user, model, override_duration(), now);
        Ok(())
    }

    /// Describe the model currently active for `user`.
    pub fn describe_model(&mut self, user: &UserId, now: DateTime<Utc>) -> ModelSelection {
        self.router.describe(user, now)
    }

    /// Session usage totals with derived rates.
    pub fn usage_snapshot(&self, now: DateTime<Utc>) -> UsageSnapshot {
        self.usage.snapshot(now)
    }
}

/// The two-entry prompt: a system instruction embedding the caller's
/// display name and source channel, then the raw user text.
fn build_prompt(message: &InboundMessage) -> Vec<ChatMessage> {
    let system = format!(
        "You are a helpful AI assistant integrated into a group chat. \
         Provide helpful, friendly, and concise responses to user messages. \
         Keep responses conversational and appropriate for a chat environment. \
         The user's name is {}. This message is from the #{} channel.",
        message.author.display_name, message.channel_name
    );
    vec![ChatMessage::system(system), ChatMessage::user(&message.text)]
}

/// First `max` characters of `text`, with an ellipsis when truncated.
fn excerpt(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max).collect();
        out.push_str("...");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use relaygate_core::Author;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Test sink recording deliveries, optionally failing them.
    #[derive(Default)]
    struct TestSink {
        cards: Mutex<Vec<ReplyCard>>,
        texts: Mutex<Vec<String>>,
        fail_cards: AtomicBool,
        fail_texts: AtomicBool,
    }

    #[async_trait::async_trait]
    impl PresentationSink for TestSink {
        async fn send_card(&self, card: &ReplyCard) -> Result<(), RelaygateError> {
            if self.fail_cards.load(Ordering::SeqCst) {
                return Err(RelaygateError::Channel {
                    message: "card rejected".into(),
                    source: None,
                });
            }
            self.cards.lock().unwrap().push(card.clone());
            Ok(())
        }

        async fn send_text(&self, text: &str) -> Result<(), RelaygateError> {
            if self.fail_texts.load(Ordering::SeqCst) {
                return Err(RelaygateError::Channel {
                    message: "text rejected".into(),
                    source: None,
                });
            }
            self.texts.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn config(endpoint: &str) -> OpenAiConfig {
        OpenAiConfig {
            api_key: Some("sk-test-key".to_string()),
            endpoint: endpoint.to_string(),
            ..OpenAiConfig::default()
        }
    }

    fn message(text: &str) -> InboundMessage {
        InboundMessage {
            text: text.to_string(),
            author: Author {
                id: UserId::from("123456789"),
                display_name: "TestUser".to_string(),
                roles: vec!["openai-user".to_string()],
                is_admin: false,
                premium_since: None,
            },
            channel_name: "test-channel".to_string(),
            guild_name: "Test Server".to_string(),
            mention_count: 0,
            attachment_count: 0,
            embed_count: 0,
            is_reply: false,
        }
    }

    fn admitted(now: DateTime<Utc>) -> FilterDecision {
        FilterDecision {
            should_process: true,
            user_authorized: true,
            content_safe: true,
            rate_limited: false,
            analysis: None,
            timestamp: now,
        }
    }

    fn rejected(now: DateTime<Utc>) -> FilterDecision {
        FilterDecision {
            should_process: false,
            ..admitted(now)
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn provider_body() -> serde_json::Value {
        serde_json::json!({
            "choices": [{"message": {"content": "Hi"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 8, "completion_tokens": 4, "total_tokens": 12}
        })
    }

    fn mock_endpoint(server: &MockServer) -> String {
        format!("{}/v1/chat/completions", server.uri())
    }

    #[tokio::test]
    async fn successful_relay_feeds_usage_and_limiter() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(provider_body()))
            .expect(1)
            .mount(&server)
            .await;

        let endpoint = mock_endpoint(&server);
        let mut orchestrator = RelayOrchestrator::new(config(&endpoint), TestSink::default(), t0());
        let mut limiter = RateLimiter::new(5, 10_000);
        let msg = message("Hello");

        assert!(!limiter.check_and_admit(&msg.author.id, t0()));
        orchestrator
            .relay(&msg, &admitted(t0()), &mut limiter, t0())
            .await;

        // Session counters and per-user token ledger both advanced by 12.
        let snapshot = orchestrator.usage_snapshot(t0());
        assert_eq!(snapshot.total_tokens_used, 12);
        assert_eq!(snapshot.api_calls_made, 1);
        let stats = limiter.stats(&msg.author.id, t0());
        assert_eq!(stats.tokens_this_hour, 12);
        assert_eq!(stats.total_tokens, 12);

        let cards = orchestrator.sink.cards.lock().unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].response_text, "Hi");
        assert_eq!(cards[0].responding_to, "Hello");
        assert_eq!(cards[0].model, "gpt-4");
        assert_eq!(cards[0].total_tokens, 12);
        // No `created` in the provider body: local clock is used.
        assert_eq!(cards[0].timestamp, t0());
    }

    #[tokio::test]
    async fn provider_created_timestamp_wins_when_present() {
        let server = MockServer::start().await;
        let mut body = provider_body();
        body["created"] = serde_json::json!(1_757_246_400);
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let endpoint = mock_endpoint(&server);
        let mut orchestrator = RelayOrchestrator::new(config(&endpoint), TestSink::default(), t0());
        let mut limiter = RateLimiter::new(5, 10_000);
        let msg = message("Hello");

        orchestrator
            .relay(&msg, &admitted(t0()), &mut limiter, t0())
            .await;

        let cards = orchestrator.sink.cards.lock().unwrap();
        assert_eq!(
            cards[0].timestamp,
            Utc.timestamp_opt(1_757_246_400, 0).single().unwrap()
        );
    }

    #[tokio::test]
    async fn rejected_decision_is_not_relayed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(provider_body()))
            .expect(0)
            .mount(&server)
            .await;

        let endpoint = mock_endpoint(&server);
        let mut orchestrator = RelayOrchestrator::new(config(&endpoint), TestSink::default(), t0());
        let mut limiter = RateLimiter::new(5, 10_000);

        orchestrator
            .relay(&message("Hello"), &rejected(t0()), &mut limiter, t0())
            .await;

        assert_eq!(orchestrator.usage_snapshot(t0()).api_calls_made, 0);
    }

    #[tokio::test]
    async fn unconfigured_key_leaves_relay_inert() {
        let mut cfg = config("https://api.openai.com/v1/chat/completions");
        cfg.api_key = Some(PLACEHOLDER_API_KEY.to_string());
        let mut orchestrator = RelayOrchestrator::new(cfg, TestSink::default(), t0());
        assert!(!orchestrator.is_active());

        let mut limiter = RateLimiter::new(5, 10_000);
        orchestrator
            .relay(&message("Hello"), &admitted(t0()), &mut limiter, t0())
            .await;
        assert_eq!(orchestrator.usage_snapshot(t0()).api_calls_made, 0);
    }

    #[tokio::test]
    async fn provider_failure_leaves_slot_unpriced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let endpoint = mock_endpoint(&server);
        let mut orchestrator = RelayOrchestrator::new(config(&endpoint), TestSink::default(), t0());
        let mut limiter = RateLimiter::new(5, 10_000);
        let msg = message("Hello");

        assert!(!limiter.check_and_admit(&msg.author.id, t0()));
        orchestrator
            .relay(&msg, &admitted(t0()), &mut limiter, t0())
            .await;

        // Accepted trade-off: the admitted slot stays at zero cost.
        let stats = limiter.stats(&msg.author.id, t0());
        assert_eq!(stats.total_messages, 1);
        assert_eq!(stats.tokens_this_hour, 0);
        assert_eq!(orchestrator.usage_snapshot(t0()).api_calls_made, 0);
        assert!(orchestrator.sink.cards.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_choices_aborts_after_nothing_recorded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let endpoint = mock_endpoint(&server);
        let mut orchestrator = RelayOrchestrator::new(config(&endpoint), TestSink::default(), t0());
        let mut limiter = RateLimiter::new(5, 10_000);

        orchestrator
            .relay(&message("Hello"), &admitted(t0()), &mut limiter, t0())
            .await;
        assert_eq!(orchestrator.usage_snapshot(t0()).api_calls_made, 0);
        assert!(orchestrator.sink.cards.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn card_failure_falls_back_to_truncated_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(provider_body()))
            .mount(&server)
            .await;

        let endpoint = mock_endpoint(&server);
        let sink = TestSink::default();
        sink.fail_cards.store(true, Ordering::SeqCst);
        let mut orchestrator = RelayOrchestrator::new(config(&endpoint), sink, t0());
        let mut limiter = RateLimiter::new(5, 10_000);

        orchestrator
            .relay(&message("Hello"), &admitted(t0()), &mut limiter, t0())
            .await;

        let texts = orchestrator.sink.texts.lock().unwrap();
        assert_eq!(texts.as_slice(), ["Hi"]);
        // Usage was still recorded before the delivery failure.
        drop(texts);
        assert_eq!(orchestrator.usage_snapshot(t0()).api_calls_made, 1);
    }

    #[tokio::test]
    async fn double_delivery_failure_is_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(provider_body()))
            .mount(&server)
            .await;

        let endpoint = mock_endpoint(&server);
        let sink = TestSink::default();
        sink.fail_cards.store(true, Ordering::SeqCst);
        sink.fail_texts.store(true, Ordering::SeqCst);
        let mut orchestrator = RelayOrchestrator::new(config(&endpoint), sink, t0());
        let mut limiter = RateLimiter::new(5, 10_000);

        // Must not panic or propagate.
        orchestrator
            .relay(&message("Hello"), &admitted(t0()), &mut limiter, t0())
            .await;
        assert!(orchestrator.sink.cards.lock().unwrap().is_empty());
        assert!(orchestrator.sink.texts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn override_model_is_used_on_the_wire() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(serde_json::json!({"model": "gpt-4o"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(provider_body()))
            .expect(1)
            .mount(&server)
            .await;

        let endpoint = mock_endpoint(&server);
        let mut orchestrator = RelayOrchestrator::new(config(&endpoint), TestSink::default(), t0());
        let mut limiter = RateLimiter::new(5, 10_000);
        let msg = message("Hello");

        orchestrator
            .set_model_override(&msg.author.id, "gpt-4o", t0())
            .unwrap();
        orchestrator
            .relay(&msg, &admitted(t0()), &mut limiter, t0())
            .await;

        let cards = orchestrator.sink.cards.lock().unwrap();
        assert_eq!(cards[0].model, "gpt-4o");
    }

    #[tokio::test]
    async fn disallowed_override_model_is_rejected() {
        let mut orchestrator = RelayOrchestrator::new(
            config("https://api.openai.com/v1/chat/completions"),
            TestSink::default(),
            t0(),
        );
        let user = UserId::from("123456789");
        let err = orchestrator
            .set_model_override(&user, "mystery-model", t0())
            .unwrap_err();
        assert!(err.to_string().contains("allow-list"));
        // The default remains active.
        assert!(!orchestrator.describe_model(&user, t0()).is_temporary());
    }

    #[tokio::test]
    async fn describe_reports_temporary_override() {
        let mut orchestrator = RelayOrchestrator::new(
            config("https://api.openai.com/v1/chat/completions"),
            TestSink::default(),
            t0(),
        );
        let user = UserId::from("123456789");
        orchestrator.set_model_override(&user, "gpt-4o", t0()).unwrap();

        let selection = orchestrator.describe_model(&user, t0());
        assert!(selection.is_temporary());
        assert_eq!(selection.model(), "gpt-4o");
    }
}
