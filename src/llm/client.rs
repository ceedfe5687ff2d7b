use super::types::GenerationRequest;
use super::GenerationResult;
use async_trait::async_trait;

/// A text-generation backend.
///
/// One call to [`generate`](GenerationClient::generate) is one request to the
/// service: no chunking, no multi-turn state, no retries. Successful output is
/// returned verbatim.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> GenerationResult;

    fn name(&self) -> &str;

    fn model_info(&self) -> Option<String> {
        None
    }
}
