// SPDX-FileCopyrightText: 2026 Relaygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the OpenAI Chat Completions API.
//!
//! Provides [`OpenAiClient`] which handles request construction,
//! authentication, and response parsing. Any non-success status is treated
//! as total failure; there is no retry.

use std::time::Duration;

use relaygate_core::RelaygateError;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::{ChatRequest, ChatResponse};

/// The placeholder key shipped in sample configuration; treated the same as
/// no key at all.
pub const PLACEHOLDER_API_KEY: &str = "your-openai-api-key-here";

/// HTTP client for Chat Completions API communication.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    endpoint: String,
}

impl OpenAiClient {
    /// Creates a new API client with bearer authentication.
    pub fn new(api_key: &str, endpoint: impl Into<String>) -> Result<Self, RelaygateError> {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {api_key}");
        headers.insert(
            "authorization",
            HeaderValue::from_str(&bearer)
                .map_err(|e| RelaygateError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| RelaygateError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// The configured Chat Completions endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends a completion request and returns the parsed response.
    ///
    /// Non-success HTTP status is a [`RelaygateError::Provider`] error with
    /// the status and body; the caller decides how to degrade.
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, RelaygateError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| RelaygateError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model = %request.model, "completion response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelaygateError::Provider {
                message: format!("API returned {status}: {body}"),
                source: None,
            });
        }

        let body = response.text().await.map_err(|e| RelaygateError::Provider {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        let chat_response: ChatResponse =
            serde_json::from_str(&body).map_err(|e| RelaygateError::Provider {
                message: format!("failed to parse API response: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(chat_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> OpenAiClient {
        OpenAiClient::new("sk-test-key", format!("{base_url}/v1/chat/completions")).unwrap()
    }

    fn test_request(model: &str) -> ChatRequest {
        ChatRequest::new(
            model,
            vec![
                ChatMessage::system("You are a helpful assistant."),
                ChatMessage::user("Hello"),
            ],
            500,
            0.7,
            &["gpt-5".to_string()],
        )
    }

    fn success_body() -> serde_json::Value {
        serde_json::json!({
            "choices": [{"message": {"content": "Hi"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 8, "completion_tokens": 4, "total_tokens": 12},
            "created": 1757246400
        })
    }

    #[tokio::test]
    async fn complete_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let response = client.complete(&test_request("gpt-4")).await.unwrap();

        assert_eq!(
            response.choices[0].message.content.as_deref(),
            Some("Hi")
        );
        assert_eq!(response.usage.unwrap().total_tokens, 12);
    }

    #[tokio::test]
    async fn client_sends_bearer_auth_header() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test-key"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.complete(&test_request("gpt-4")).await;
        assert!(result.is_ok(), "headers should match: {result:?}");
    }

    #[tokio::test]
    async fn next_gen_request_body_has_no_temperature() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-5-nano",
                "max_completion_tokens": 500
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let request = test_request("gpt-5-nano");
        assert!(request.temperature.is_none());
        assert!(request.max_tokens.is_none());
        client.complete(&request).await.unwrap();
    }

    #[tokio::test]
    async fn non_success_status_fails_without_retry() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(429).set_body_string("{\"error\": \"rate limited\"}"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.complete(&test_request("gpt-4")).await.unwrap_err();
        assert!(err.to_string().contains("429"), "got: {err}");
    }

    #[tokio::test]
    async fn malformed_body_is_a_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.complete(&test_request("gpt-4")).await.unwrap_err();
        assert!(err.to_string().contains("parse"), "got: {err}");
    }
}
