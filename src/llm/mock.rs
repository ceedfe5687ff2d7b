use super::client::GenerationClient;
use super::error::GenerationError;
use super::types::{GenerationRequest, GenerationResponse};
use super::GenerationResult;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Scripted client: replays queued responses in order and records every
/// request it receives.
pub struct MockGenerationClient {
    responses: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<GenerationRequest>>,
    name: String,
}

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub text: String,
    pub error: Option<GenerationError>,
    pub delay: Option<Duration>,
}

impl MockResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            error: None,
            delay: None,
        }
    }

    pub fn error(error: GenerationError) -> Self {
        Self {
            text: String::new(),
            error: Some(error),
            delay: None,
        }
    }

    /// Holds the response back for `delay` before returning it
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockGenerationClient {
    pub fn new() -> Self {
        Self::with_name("MockGeneration")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            name: name.into(),
        }
    }

    pub fn add_response(&self, response: MockResponse) {
        lock(&self.responses).push_back(response);
    }

    pub fn add_responses(&self, responses: impl IntoIterator<Item = MockResponse>) {
        lock(&self.responses).extend(responses);
    }

    pub fn remaining_responses(&self) -> usize {
        lock(&self.responses).len()
    }

    /// Number of `generate` calls received so far
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Every request received, in call order
    pub fn requests(&self) -> Vec<GenerationRequest> {
        lock(&self.requests).clone()
    }
}

impl Default for MockGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationClient for MockGenerationClient {
    async fn generate(&self, request: GenerationRequest) -> GenerationResult {
        lock(&self.requests).push(request);

        let response = lock(&self.responses).pop_front().ok_or_else(|| {
            GenerationError::invalid_request("MockGenerationClient: No more responses in queue")
        })?;

        if let Some(delay) = response.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = response.error {
            return Err(error);
        }

        Ok(GenerationResponse::text(response.text, Duration::from_millis(10)))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn model_info(&self) -> Option<String> {
        Some("mock-model".to_string())
    }
}

impl std::fmt::Debug for MockGenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockGenerationClient")
            .field("name", &self.name)
            .field("remaining_responses", &self.remaining_responses())
            .field("call_count", &self.call_count())
            .finish()
    }
}
