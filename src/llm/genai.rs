//! GenAI-based generation client
//!
//! This module provides a client implementation using the `genai` crate,
//! supporting multiple providers (Ollama, OpenAI, Anthropic, Gemini, xAI, Groq).

use super::client::GenerationClient;
use super::credential::ApiKey;
use super::error::GenerationError;
use super::types::{ChatMessage, GenerationRequest, GenerationResponse, MessageRole};
use super::GenerationResult;
use async_trait::async_trait;
use genai::adapter::AdapterKind;
use genai::chat::{ChatMessage as GenAIChatMessage, ChatOptions, ChatRequest as GenAIChatRequest};
use genai::resolver::{AuthData, Endpoint, ServiceTargetResolver};
use genai::{Client, ServiceTarget};
use regex::Regex;
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// GenAI-based client supporting multiple providers
///
/// Provider errors arrive as opaque `genai::Error` values; they are classified
/// from the HTTP status and wording embedded in their message.
pub struct GenAIClient {
    client: Client,
    model: String,
    provider: AdapterKind,
    timeout: Duration,
}

impl GenAIClient {
    /// Creates a new GenAI client
    ///
    /// # Arguments
    ///
    /// * `provider` - Provider to use
    /// * `model` - Model name (without provider prefix)
    /// * `timeout` - Per-request timeout
    /// * `api_key` - Credential; when `None` genai's own lookup applies
    /// * `endpoint` - Base URL overriding the provider default
    pub fn new(
        provider: AdapterKind,
        model: String,
        timeout: Duration,
        api_key: Option<ApiKey>,
        endpoint: Option<String>,
    ) -> Self {
        let client = if api_key.is_none() && endpoint.is_none() {
            Client::default()
        } else {
            if let Some(url) = &endpoint {
                debug!("Using custom endpoint for {}: {}", provider.as_str(), url);
            }

            let resolver = ServiceTargetResolver::from_resolver_fn(
                move |service_target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
                    let endpoint = match &endpoint {
                        Some(url) => Endpoint::from_owned(url.clone()),
                        None => service_target.endpoint,
                    };
                    let auth = match &api_key {
                        Some(key) => AuthData::from_single(key.expose().to_string()),
                        None => service_target.auth,
                    };

                    Ok(ServiceTarget {
                        endpoint,
                        auth,
                        model: service_target.model,
                    })
                },
            );

            Client::builder()
                .with_service_target_resolver(resolver)
                .build()
        };

        debug!(
            "Creating GenAI client: provider={}, model={}",
            provider.as_str(),
            model,
        );

        Self {
            client,
            model,
            provider,
            timeout,
        }
    }

    fn convert_message(msg: &ChatMessage) -> GenAIChatMessage {
        match msg.role {
            MessageRole::System => GenAIChatMessage::system(&msg.content),
            MessageRole::User => GenAIChatMessage::user(&msg.content),
            MessageRole::Assistant => GenAIChatMessage::assistant(&msg.content),
        }
    }
}

#[async_trait]
impl GenerationClient for GenAIClient {
    async fn generate(&self, request: GenerationRequest) -> GenerationResult {
        if request.prompt.trim().is_empty() {
            return Err(GenerationError::invalid_request("Prompt is empty"));
        }

        let start = Instant::now();

        let messages: Vec<GenAIChatMessage> = request
            .messages()
            .iter()
            .map(Self::convert_message)
            .collect();
        let genai_request = GenAIChatRequest::new(messages);

        let mut options = ChatOptions::default();
        if let Some(temp) = request.temperature {
            options = options.with_temperature(temp as f64);
        }
        if let Some(max_tokens) = request.max_tokens {
            options = options.with_max_tokens(max_tokens);
        }

        let model = if request.model.is_empty() {
            self.model.as_str()
        } else {
            request.model.as_str()
        };

        let response = match tokio::time::timeout(
            self.timeout,
            self.client.exec_chat(model, genai_request, Some(&options)),
        )
        .await
        {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => {
                let message = format!("{} request failed: {}", self.provider.as_str(), e);
                error!("{}", message);
                return Err(classify_provider_error(&message));
            }
            Err(_) => {
                error!(
                    "{} request timed out after {}s",
                    self.provider.as_str(),
                    self.timeout.as_secs()
                );
                return Err(GenerationError::timeout(self.timeout));
            }
        };

        let text = response.first_text().map(str::to_string).ok_or_else(|| {
            GenerationError::transient(format!(
                "{} returned no text content",
                self.provider.as_str()
            ))
        })?;

        Ok(GenerationResponse::text(text, start.elapsed()).with_model(model))
    }

    fn name(&self) -> &str {
        self.provider.as_str()
    }

    fn model_info(&self) -> Option<String> {
        Some(self.model.clone())
    }
}

impl std::fmt::Debug for GenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAIClient")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn status_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(?:status|http)\b[^0-9]{0,16}([1-5][0-9]{2})\b")
            .expect("status pattern is valid")
    })
}

/// Classifies a provider error message.
///
/// An embedded HTTP status wins; otherwise wording about keys, quotas and
/// connectivity decides. Anything unrecognised is treated as transient.
fn classify_provider_error(message: &str) -> GenerationError {
    if let Some(status) = status_pattern()
        .captures(message)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u16>().ok())
    {
        return GenerationError::from_status(status, message, None);
    }

    let lower = message.to_lowercase();
    if lower.contains("api key") || lower.contains("apikey") || lower.contains("unauthorized") {
        GenerationError::auth(message)
    } else if lower.contains("rate limit") || lower.contains("too many requests") {
        GenerationError::RateLimited {
            message: message.to_string(),
            retry_after: None,
        }
    } else {
        GenerationError::transient(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FailureKind;

    #[test]
    fn test_genai_client_creation() {
        let client = GenAIClient::new(
            AdapterKind::Ollama,
            "qwen2.5-coder:7b".to_string(),
            Duration::from_secs(30),
            None,
            None,
        );

        assert_eq!(client.name(), "Ollama");
        assert_eq!(client.model_info(), Some("qwen2.5-coder:7b".to_string()));
    }

    #[test]
    fn test_genai_client_with_credential_and_endpoint() {
        let client = GenAIClient::new(
            AdapterKind::Anthropic,
            "claude-sonnet".to_string(),
            Duration::from_secs(30),
            Some(ApiKey::new("sk-ant")),
            Some("http://localhost:8080/".to_string()),
        );
        assert!(!format!("{:?}", client).contains("sk-ant"));
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected() {
        let client = GenAIClient::new(
            AdapterKind::Ollama,
            "qwen2.5-coder:7b".to_string(),
            Duration::from_secs(1),
            None,
            None,
        );
        let err = client
            .generate(GenerationRequest::new("", ""))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::InvalidRequest);
    }

    #[test]
    fn test_classify_embedded_status() {
        let err = classify_provider_error("Web call failed for model 'x'. Status: 429 Too Many Requests");
        assert_eq!(err.kind(), FailureKind::RateLimited);

        let err = classify_provider_error("Response failed with HTTP 401 Unauthorized");
        assert_eq!(err.kind(), FailureKind::Auth);

        let err = classify_provider_error("status code 503, body: overloaded");
        assert_eq!(err.kind(), FailureKind::TransientService);

        let err = classify_provider_error("Request failed. Status: 400 Bad Request");
        assert_eq!(err.kind(), FailureKind::InvalidRequest);
    }

    #[test]
    fn test_classify_by_wording() {
        assert_eq!(
            classify_provider_error("Missing API key for OpenAI").kind(),
            FailureKind::Auth
        );
        assert_eq!(
            classify_provider_error("rate limit reached for requests").kind(),
            FailureKind::RateLimited
        );
        assert_eq!(
            classify_provider_error("error sending request: connection reset").kind(),
            FailureKind::TransientService
        );
    }

    #[test]
    fn test_debug_impl() {
        fn assert_debug<T: std::fmt::Debug>() {}
        assert_debug::<GenAIClient>();
    }
}
