//! OpenAI-compatible HTTP client
//!
//! Talks to `/v1/chat/completions` directly so HTTP status codes and the
//! `Retry-After` header can be classified precisely. Works against the hosted
//! OpenAI API and any server that exposes the same endpoint.

use super::client::GenerationClient;
use super::credential::ApiKey;
use super::error::GenerationError;
use super::types::{ChatMessage, GenerationRequest, GenerationResponse};
use super::GenerationResult;
use async_trait::async_trait;
use reqwest::header::{HeaderValue, RETRY_AFTER};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com";

/// Direct client for OpenAI-compatible chat completion endpoints
///
/// The client is stateless between calls and can be shared across tasks
/// through an `Arc`.
pub struct OpenAIClient {
    endpoint: String,
    api_key: ApiKey,
    http_client: Client,
    timeout: Duration,
}

impl OpenAIClient {
    /// Creates a client for `endpoint` (without the `/v1/...` suffix).
    pub fn new(endpoint: impl Into<String>, api_key: ApiKey, timeout: Duration) -> Result<Self, GenerationError> {
        let http_client = Client::builder().timeout(timeout).build().map_err(|e| {
            GenerationError::invalid_request(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
            http_client,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_send_error(&self, e: reqwest::Error) -> GenerationError {
        if e.is_timeout() {
            error!("Request timed out after {:?}", self.timeout);
            GenerationError::timeout(self.timeout)
        } else if e.is_connect() {
            error!("Cannot connect to {}", self.endpoint);
            GenerationError::transient(format!("Connection failed: {}", e))
        } else {
            error!("Request error: {}", e);
            GenerationError::transient(format!("Request failed: {}", e))
        }
    }
}

#[async_trait]
impl GenerationClient for OpenAIClient {
    async fn generate(&self, request: GenerationRequest) -> GenerationResult {
        if request.prompt.trim().is_empty() {
            return Err(GenerationError::invalid_request("Prompt is empty"));
        }

        let url = format!("{}/v1/chat/completions", self.endpoint);
        let body = CompletionRequest {
            model: &request.model,
            messages: request.messages(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!(
            model = %request.model,
            prompt_chars = request.prompt.chars().count(),
            "Sending chat completion request"
        );

        let start = Instant::now();
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let retry_after = response.headers().get(RETRY_AFTER).and_then(parse_retry_after);
        let body_text = response
            .text()
            .await
            .map_err(|e| GenerationError::transient(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            let message = extract_error_message(&body_text).unwrap_or_else(|| {
                if body_text.trim().is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string()
                } else {
                    body_text.clone()
                }
            });
            error!("API returned error status {}: {}", status, message);
            return Err(GenerationError::from_status(
                status.as_u16(),
                message,
                retry_after,
            ));
        }

        let parsed: CompletionResponse = serde_json::from_str(&body_text).map_err(|e| {
            error!("Failed to parse completion response: {}", e);
            GenerationError::TransientService {
                message: format!("JSON parse error: {}", e),
                status_code: Some(status.as_u16()),
            }
        })?;

        if let Some(usage) = &parsed.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Completion usage"
            );
        }

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| GenerationError::TransientService {
                message: "No content in completion response".to_string(),
                status_code: Some(status.as_u16()),
            })?;

        let elapsed = start.elapsed();
        info!("Generation completed in {:.2}s", elapsed.as_secs_f64());

        let mut response = GenerationResponse::text(text, elapsed);
        if let Some(model) = parsed.model {
            response = response.with_model(model);
        }
        Ok(response)
    }

    fn name(&self) -> &str {
        "OpenAI"
    }
}

impl fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

fn extract_error_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }

    let parsed = serde_json::from_str::<serde_json::Value>(body).ok()?;

    if let Some(msg) = parsed
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(|message| message.as_str())
    {
        return Some(msg.to_string());
    }

    parsed
        .get("message")
        .and_then(|message| message.as_str())
        .map(ToOwned::to_owned)
}

fn parse_retry_after(value: &HeaderValue) -> Option<Duration> {
    let raw = value.to_str().ok()?.trim();
    if let Ok(seconds) = raw.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(|s| Duration::try_from_secs_f64(s).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FailureKind;

    fn client_for(server: &mockito::Server) -> OpenAIClient {
        OpenAIClient::new(server.url(), ApiKey::new("sk-test"), Duration::from_secs(5)).unwrap()
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("gpt-4.1", "Write a plan").with_system("You are an expert")
    }

    #[tokio::test]
    async fn test_success_returns_text_verbatim() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r###"{"model":"gpt-4.1","choices":[{"message":{"role":"assistant","content":"  ## Plan\n\n- step  "}}],"usage":{"prompt_tokens":10,"completion_tokens":5}}"###,
            )
            .expect(1)
            .create_async()
            .await;

        let response = client_for(&server).generate(request()).await.unwrap();

        assert_eq!(response.text, "  ## Plan\n\n- step  ");
        assert_eq!(response.model.as_deref(), Some("gpt-4.1"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_request_body_carries_system_and_prompt() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "gpt-4.1",
                "messages": [
                    {"role": "system", "content": "You are an expert"},
                    {"role": "user", "content": "Write a plan"}
                ]
            })))
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"ok"}}]}"#)
            .create_async()
            .await;

        let response = client_for(&server).generate(request()).await.unwrap();
        assert_eq!(response.text, "ok");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_401_is_auth_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Incorrect API key provided"}}"#)
            .create_async()
            .await;

        let err = client_for(&server).generate(request()).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Auth);
        assert_eq!(err.message(), "Incorrect API key provided");
        assert!(!err.is_retriable());
    }

    #[tokio::test]
    async fn test_429_is_rate_limited_with_retry_after() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_header("retry-after", "12")
            .create_async()
            .await;

        let err = client_for(&server).generate(request()).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::RateLimited);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(12)));
        assert!(err.is_retriable());
    }

    #[tokio::test]
    async fn test_500_is_transient() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(500)
            .create_async()
            .await;

        let err = client_for(&server).generate(request()).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::TransientService);
        assert!(err.is_retriable());
    }

    #[tokio::test]
    async fn test_400_is_invalid_request() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(400)
            .with_body(r#"{"error":{"message":"maximum context length exceeded"}}"#)
            .create_async()
            .await;

        let err = client_for(&server).generate(request()).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::InvalidRequest);
        assert!(err.message().contains("context length"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_transient() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = client_for(&server).generate(request()).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::TransientService);
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected_without_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .expect(0)
            .create_async()
            .await;

        let err = client_for(&server)
            .generate(GenerationRequest::new("gpt-4.1", "   "))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::InvalidRequest);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_connection_refused_is_transient() {
        let client = OpenAIClient::new(
            "http://127.0.0.1:9",
            ApiKey::new("sk-test"),
            Duration::from_secs(2),
        )
        .unwrap();

        let err = client.generate(request()).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::TransientService);
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(
            parse_retry_after(&HeaderValue::from_static("3")),
            Some(Duration::from_secs(3))
        );
        assert_eq!(
            parse_retry_after(&HeaderValue::from_static("1.5")),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(
            parse_retry_after(&HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT")),
            None
        );
    }

    #[test]
    fn test_parse_retry_after_out_of_range() {
        assert_eq!(parse_retry_after(&HeaderValue::from_static("1e20")), None);
        assert_eq!(parse_retry_after(&HeaderValue::from_static("-5")), None);
        assert_eq!(parse_retry_after(&HeaderValue::from_static("NaN")), None);
        assert_eq!(parse_retry_after(&HeaderValue::from_static("inf")), None);
    }

    #[tokio::test]
    async fn test_429_with_huge_retry_after_is_still_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_header("retry-after", "1e20")
            .create_async()
            .await;

        let err = client_for(&server).generate(request()).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::RateLimited);
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let client = OpenAIClient::new(
            "https://api.openai.com/",
            ApiKey::new("k"),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(client.endpoint(), "https://api.openai.com");
    }

    #[test]
    fn test_debug_hides_key() {
        let client = OpenAIClient::new(DEFAULT_OPENAI_ENDPOINT, ApiKey::new("sk-secret"), Duration::from_secs(1))
            .unwrap();
        assert!(!format!("{:?}", client).contains("sk-secret"));
    }
}
