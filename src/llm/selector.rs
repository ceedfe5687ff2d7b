use crate::config::PlannerConfig;
use crate::llm::{
    ApiKey, GenAIClient, GenerationClient, GenerationError, OpenAIClient,
    DEFAULT_OPENAI_ENDPOINT,
};
use genai::adapter::AdapterKind;
use std::sync::Arc;
use tracing::{debug, info};

pub struct SelectedClient {
    pub client: Arc<dyn GenerationClient>,
    pub provider: AdapterKind,
    pub description: String,
}

/// Environment variable holding the provider's credential, or `None` when the
/// provider runs without one (Ollama).
pub fn provider_credential_var(provider: AdapterKind) -> Option<&'static str> {
    provider.default_key_env_name()
}

/// Builds the generation client for the configured provider.
///
/// OpenAI goes through the direct HTTP client; every other provider goes
/// through genai. A provider that needs a credential fails with an auth
/// error here, before any request is made.
pub fn select_generation_client(
    config: &PlannerConfig,
    credential: Option<ApiKey>,
) -> Result<SelectedClient, GenerationError> {
    let provider = config.provider;
    let timeout = config.request_timeout();

    if credential.is_none() {
        if let Some(var) = provider_credential_var(provider) {
            return Err(GenerationError::auth(format!(
                "No credential for {}. Set {}",
                provider.as_str(),
                var
            )));
        }
    }

    if provider == AdapterKind::OpenAI {
        if let Some(key) = credential {
            let endpoint = config
                .api_base
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENAI_ENDPOINT.to_string());
            debug!("Selecting direct OpenAI client at {}", endpoint);
            let client = OpenAIClient::new(endpoint, key, timeout)?;

            info!("Using provider: {} ({})", provider.as_str(), config.model);
            return Ok(SelectedClient {
                client: Arc::new(client),
                provider,
                description: format!("{} ({})", provider.as_str(), config.model),
            });
        }
    }

    let client = GenAIClient::new(
        provider,
        config.model.clone(),
        timeout,
        credential,
        config.api_base.clone(),
    );

    info!("Using provider: {} ({})", provider.as_str(), config.model);
    Ok(SelectedClient {
        client: Arc::new(client),
        provider,
        description: format!("{} ({})", provider.as_str(), config.model),
    })
}
