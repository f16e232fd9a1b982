// jokecam-core/src/api.rs

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use tracing::{debug, error, trace};

use crate::config::{ClientConfig, Credential};
use crate::errors::{JokeError, Result};
use crate::models::chat::{ChatMessage, CompletionRequest, CompletionResponse};
use crate::utils::redact_image_data;

/// Anything that can turn a conversation into a completion.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<CompletionResponse>;
    fn name(&self) -> &str;
}

/// Client for the Anthropic Messages endpoint.
#[derive(Clone)]
pub struct ApiClient {
    config: ClientConfig,
    http_client: Client,
}

impl ApiClient {
    pub fn new(config: ClientConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    pub fn build_request(&self, messages: &[ChatMessage]) -> CompletionRequest {
        CompletionRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            messages: messages.to_vec(),
        }
    }

    /// Headers for an authenticated request. Errors if the key is absent or malformed.
    pub fn build_headers(&self) -> Result<HeaderMap> {
        let api_key = match &self.config.credential {
            Credential::Present(key) => key,
            Credential::Absent => {
                return Err(JokeError::MissingCredential(
                    self.config.api_key_env_var.clone(),
                ))
            }
        };
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_str(api_key).map_err(|e| {
                JokeError::config(format!("API key is not a valid header value: {}", e))
            })?,
        );
        headers.insert(
            HeaderName::from_static("anthropic-version"),
            HeaderValue::from_str(&self.config.anthropic_version).map_err(|e| {
                JokeError::config(format!("Invalid anthropic-version header: {}", e))
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Sends `messages` to the model. Without a credential this logs and returns
    /// `CompletionResponse::fallback()` instead of touching the network.
    pub async fn complete(&self, messages: Vec<ChatMessage>) -> Result<CompletionResponse> {
        if messages.is_empty() {
            return Err(JokeError::EmptyConversation);
        }

        let headers = match self.build_headers() {
            Ok(headers) => headers,
            Err(e @ JokeError::MissingCredential(_)) => {
                error!("{}. Returning a default joke instead.", e);
                return Ok(CompletionResponse::fallback());
            }
            Err(e) => return Err(e),
        };

        let request_body = self.build_request(&messages);
        debug!(
            endpoint = %self.config.endpoint,
            model = %request_body.model,
            num_messages = request_body.messages.len(),
            "Sending completion request."
        );
        trace!(payload = %redact_image_data(&request_body), "Request JSON");

        let response = self
            .http_client
            .post(&self.config.endpoint)
            .headers(headers)
            .json(&request_body)
            .send()
            .await
            .map_err(JokeError::Network)?;

        let status = response.status();
        let response_text = response.text().await.map_err(JokeError::Network)?;

        if !status.is_success() {
            debug!(
                "API request failed. Status: {}, Body: {}",
                status, response_text
            );
            return Err(JokeError::Request {
                status: status.as_u16(),
                body: response_text,
            });
        }

        let completion: CompletionResponse = serde_json::from_str(&response_text).map_err(|e| {
            debug!("ERROR: failed to deserialize API response {}", response_text);
            JokeError::Decode(e)
        })?;

        debug!(
            id = %completion.id,
            stop_reason = %completion.stop_reason,
            input_tokens = completion.usage.input_tokens,
            output_tokens = completion.usage.output_tokens,
            "Received completion."
        );
        Ok(completion)
    }
}

#[async_trait]
impl CompletionProvider for ApiClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<CompletionResponse> {
        ApiClient::complete(self, messages).await
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::{ContentBlock, FALLBACK_JOKE};
    use httpmock::prelude::*;
    use serde_json::json;

    const ENDPOINT_PATH: &str = "/v1/messages";

    // --- Test Helpers ---
    fn create_test_client(base_url: &str) -> ApiClient {
        let config = ClientConfig::default()
            .with_endpoint(format!("{}{}", base_url, ENDPOINT_PATH))
            .with_credential("test-api-key");
        ApiClient::new(config, Client::new())
    }

    fn photo_messages() -> Vec<ChatMessage> {
        vec![ChatMessage::user_blocks(vec![
            ContentBlock::base64_image("image/jpeg", "/9j/4AAQ"),
            ContentBlock::text("Joke, please."),
        ])]
    }

    fn completion_json(text: &str) -> serde_json::Value {
        json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "model": "claude-3-5-sonnet-20241022",
            "content": [{"type": "text", "text": text}],
            "stop_reason": "end_turn",
            "stop_sequence": null,
            "usage": {
                "input_tokens": 12,
                "output_tokens": 7,
                "cache_creation_input_tokens": 0,
                "cache_read_input_tokens": 0
            }
        })
    }

    // --- Tests for build_request / build_headers ---
    #[test]
    fn test_build_request_uses_fixed_model_and_max_tokens() {
        let client = create_test_client("http://fake.endpoint");
        let messages = photo_messages();
        let request = client.build_request(&messages);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "claude-3-5-sonnet-20241022",
                "max_tokens": 1024,
                "messages": messages
            })
        );
    }

    #[test]
    fn test_build_headers() {
        let client = create_test_client("http://fake.endpoint");
        let headers = client.build_headers().unwrap();
        assert_eq!(headers["x-api-key"], "test-api-key");
        assert_eq!(headers["anthropic-version"], "2023-06-01");
        assert_eq!(headers["content-type"], "application/json");
    }

    #[test]
    fn test_build_headers_without_credential() {
        let client = ApiClient::new(ClientConfig::default(), Client::new());
        let err = client.build_headers().unwrap_err();
        assert!(matches!(err, JokeError::MissingCredential(ref var) if var == "ANTHROPIC_API_KEY"));
    }

    // --- Tests for complete ---
    #[tokio::test]
    async fn test_complete_success() {
        let server = MockServer::start_async().await;
        let client = create_test_client(&server.base_url());
        let messages = photo_messages();

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(ENDPOINT_PATH)
                    .header("x-api-key", "test-api-key")
                    .header("anthropic-version", "2023-06-01")
                    .header("content-type", "application/json")
                    .json_body(json!({
                        "model": "claude-3-5-sonnet-20241022",
                        "max_tokens": 1024,
                        "messages": messages.clone()
                    }));
                then.status(200).json_body(completion_json("A dry joke 😂"));
            })
            .await;

        let result = client.complete(messages).await;
        mock.assert_async().await;
        let response = result.expect("Expected Ok");
        assert_eq!(response.id, "msg_test");
        assert_eq!(response.first_text(), Some("A dry joke 😂"));
        assert_eq!(response.usage.output_tokens, 7);
    }

    #[tokio::test]
    async fn test_complete_server_error_is_not_retried() {
        let server = MockServer::start_async().await;
        let client = create_test_client(&server.base_url());

        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path(ENDPOINT_PATH);
                then.status(500).body("Server error");
            })
            .await;

        let result = client.complete(photo_messages()).await;
        assert_eq!(mock.hits_async().await, 1);
        match result {
            Err(JokeError::Request { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "Server error");
            }
            other => panic!("Expected Request error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_complete_client_error_status() {
        let server = MockServer::start_async().await;
        let client = create_test_client(&server.base_url());
        server
            .mock_async(|when, then| {
                when.method(POST).path(ENDPOINT_PATH);
                then.status(401).json_body(json!({"type": "error"}));
            })
            .await;

        let err = client.complete(photo_messages()).await.unwrap_err();
        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn test_complete_malformed_body() {
        let server = MockServer::start_async().await;
        let client = create_test_client(&server.base_url());
        server
            .mock_async(|when, then| {
                when.method(POST).path(ENDPOINT_PATH);
                then.status(200).json_body(json!({"unexpected": true}));
            })
            .await;

        let err = client.complete(photo_messages()).await.unwrap_err();
        assert!(matches!(err, JokeError::Decode(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_complete_without_credential_returns_fallback() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path(ENDPOINT_PATH);
                then.status(500);
            })
            .await;
        let config = ClientConfig::default().with_endpoint(server.url(ENDPOINT_PATH));
        let client = ApiClient::new(config, Client::new());

        let first = client.complete(photo_messages()).await.unwrap();
        let second = client
            .complete(vec![ChatMessage::user_text("something else entirely")])
            .await
            .unwrap();

        assert_eq!(mock.hits_async().await, 0);
        assert_eq!(first, second);
        assert_eq!(first.first_text(), Some(FALLBACK_JOKE));
        assert_eq!(first.usage.input_tokens, 0);
        assert_eq!(first.usage.output_tokens, 0);
    }

    #[tokio::test]
    async fn test_complete_rejects_empty_conversation() {
        let client = create_test_client("http://127.0.0.1:9");
        let err = client.complete(Vec::new()).await.unwrap_err();
        assert!(matches!(err, JokeError::EmptyConversation));
    }

    #[tokio::test]
    async fn test_complete_network_error() {
        // Port 9 (discard) is not listening in the test environment.
        let client = create_test_client("http://127.0.0.1:9");
        let err = client.complete(photo_messages()).await.unwrap_err();
        assert!(matches!(err, JokeError::Network(_)), "got {:?}", err);
    }
}
