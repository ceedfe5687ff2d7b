//! Generation client abstraction layer
//!
//! This module provides a trait-based abstraction over text-generation
//! services, allowing different backends (direct OpenAI HTTP, GenAI
//! multi-provider, Mock) to be used interchangeably by the pipeline stages.

mod client;
mod credential;
mod error;
mod genai;
mod mock;
mod openai;
mod selector;
mod types;

pub use client::GenerationClient;
pub use credential::ApiKey;
pub use error::{FailureKind, GenerationError};
pub use genai::GenAIClient;
pub use mock::{MockGenerationClient, MockResponse};
pub use openai::{OpenAIClient, DEFAULT_OPENAI_ENDPOINT};
pub use selector::{provider_credential_var, select_generation_client, SelectedClient};
pub use types::{ChatMessage, GenerationRequest, GenerationResponse, MessageRole};

/// Outcome of a single generation call
pub type GenerationResult = Result<GenerationResponse, GenerationError>;
