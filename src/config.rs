//! Configuration management for migration-planner
//!
//! Settings are loaded from environment variables with defaults and then
//! overridden by command-line flags. The resolved value is passed explicitly
//! to the pipeline; nothing below the CLI reads the environment.
//!
//! # Environment Variables
//!
//! - `MIGRATION_PLANNER_PROVIDER`: openai|anthropic|ollama|gemini|xai|groq - default: "openai"
//! - `MIGRATION_PLANNER_MODEL`: Model identifier - default: "gpt-4.1"
//! - `MIGRATION_PLANNER_API_BASE`: Base URL overriding the provider endpoint
//! - `MIGRATION_PLANNER_REQUEST_TIMEOUT`: Per-call timeout in seconds - default: "300"
//! - `MIGRATION_PLANNER_MAX_PROMPT_SIZE`: Prompt limit in characters - default: "400000"
//! - `MIGRATION_PLANNER_MAX_TOKENS`: Max output tokens - default: "16384"
//! - `MIGRATION_PLANNER_TEMPERATURE`: Sampling temperature - default: "0.2"
//! - `MIGRATION_PLANNER_OUTPUT`: Report path - default: "Migration_Plan.md"
//! - `MIGRATION_PLANNER_LOG_LEVEL`: Logging level - default: "info"
//! - `MIGRATION_PLANNER_RETRIES`: Extra attempts per stage (0-10) - default: "0"
//! - `MIGRATION_PLANNER_RETRY_DELAY_MS`: Base backoff delay - default: "2000"
//! - `MIGRATION_PLANNER_RETRY_JITTER`: Jitter factor - default: "0.25"
//!
//! Credentials use each provider's conventional variable (`OPENAI_API_KEY`,
//! `ANTHROPIC_API_KEY`, ...).

use crate::pipeline::PipelineConfig;
use crate::retry::RetryPolicy;
use genai::adapter::AdapterKind;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_MODEL: &str = "gpt-4.1";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;
const DEFAULT_MAX_PROMPT_SIZE: usize = 400_000;
const DEFAULT_MAX_TOKENS: u32 = 16_384;
const DEFAULT_TEMPERATURE: f32 = 0.2;
const DEFAULT_OUTPUT: &str = "Migration_Plan.md";
const DEFAULT_RETRY_DELAY_MS: u64 = 2_000;
const DEFAULT_RETRY_JITTER: f64 = 0.25;
const MAX_RETRY_ATTEMPTS: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid provider: {0}. Valid options: openai, anthropic, ollama, gemini, xai, groq")]
    InvalidProvider(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub provider: AdapterKind,
    pub model: String,
    /// Overrides the provider's default endpoint
    pub api_base: Option<String>,
    pub request_timeout_secs: u64,
    /// Prompt size limit in characters
    pub max_prompt_size: usize,
    pub max_tokens: u32,
    pub temperature: f32,
    pub output: PathBuf,
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Extra attempts per stage on retriable failures; 0 disables retrying
    pub retry_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub retry_jitter: f64,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

/// Parses a provider name the way `AdapterKind` spells it in lowercase.
pub fn parse_provider(name: &str) -> Result<AdapterKind, ConfigError> {
    AdapterKind::from_lower_str(&name.trim().to_lowercase())
        .ok_or_else(|| ConfigError::InvalidProvider(name.to_string()))
}

impl Default for PlannerConfig {
    /// Loads `MIGRATION_PLANNER_*` variables, falling back to defaults for
    /// anything missing or unparseable.
    fn default() -> Self {
        let provider = env::var("MIGRATION_PLANNER_PROVIDER")
            .ok()
            .and_then(|s| parse_provider(&s).ok())
            .unwrap_or(AdapterKind::OpenAI);

        let model = env::var("MIGRATION_PLANNER_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let api_base = env::var("MIGRATION_PLANNER_API_BASE")
            .ok()
            .filter(|u| !u.trim().is_empty());

        let log_level = env::var("MIGRATION_PLANNER_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            provider,
            model,
            api_base,
            request_timeout_secs: env_parse("MIGRATION_PLANNER_REQUEST_TIMEOUT")
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_prompt_size: env_parse("MIGRATION_PLANNER_MAX_PROMPT_SIZE")
                .unwrap_or(DEFAULT_MAX_PROMPT_SIZE),
            max_tokens: env_parse("MIGRATION_PLANNER_MAX_TOKENS").unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: env_parse("MIGRATION_PLANNER_TEMPERATURE")
                .unwrap_or(DEFAULT_TEMPERATURE),
            output: env::var("MIGRATION_PLANNER_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT)),
            log_level,
            retry_attempts: env_parse("MIGRATION_PLANNER_RETRIES").unwrap_or(0),
            retry_base_delay_ms: env_parse("MIGRATION_PLANNER_RETRY_DELAY_MS")
                .unwrap_or(DEFAULT_RETRY_DELAY_MS),
            retry_jitter: env_parse("MIGRATION_PLANNER_RETRY_JITTER")
                .unwrap_or(DEFAULT_RETRY_JITTER),
        }
    }
}

impl PlannerConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` naming the first field out of range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Model identifier must not be empty".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > 1800 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 30 minutes".to_string(),
            ));
        }

        if self.max_prompt_size < 1024 {
            return Err(ConfigError::ValidationFailed(
                "Max prompt size must be at least 1024 characters".to_string(),
            ));
        }
        if self.max_prompt_size > 10_000_000 {
            return Err(ConfigError::ValidationFailed(
                "Max prompt size cannot exceed 10000000 characters".to_string(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max output tokens must be at least 1".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationFailed(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }

        if self.retry_attempts > MAX_RETRY_ATTEMPTS {
            return Err(ConfigError::ValidationFailed(format!(
                "Retries cannot exceed {}, got {}",
                MAX_RETRY_ATTEMPTS, self.retry_attempts
            )));
        }

        if !(0.0..=1.0).contains(&self.retry_jitter) {
            return Err(ConfigError::ValidationFailed(format!(
                "Retry jitter must be between 0.0 and 1.0, got {}",
                self.retry_jitter
            )));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The subset of settings the pipeline stages consume
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            model: self.model.clone(),
            size_limit: self.max_prompt_size,
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts.saturating_add(1))
            .with_base_delay(Duration::from_millis(self.retry_base_delay_ms))
            .with_jitter(self.retry_jitter)
    }
}

impl fmt::Display for PlannerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Migration Planner Configuration:")?;
        writeln!(f, "  Provider: {}", self.provider.as_lower_str())?;
        writeln!(f, "  Model: {}", self.model)?;
        if let Some(ref url) = self.api_base {
            writeln!(f, "  API Base: {}", url)?;
        }
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  Max Prompt Size: {} chars", self.max_prompt_size)?;
        writeln!(f, "  Max Output Tokens: {}", self.max_tokens)?;
        writeln!(f, "  Temperature: {}", self.temperature)?;
        writeln!(f, "  Output: {}", self.output.display())?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(
            f,
            "  Retries: {} (base delay {}ms, jitter {})",
            self.retry_attempts, self.retry_base_delay_ms, self.retry_jitter
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    fn base_config() -> PlannerConfig {
        PlannerConfig {
            provider: AdapterKind::OpenAI,
            model: "gpt-4.1".to_string(),
            api_base: None,
            request_timeout_secs: 300,
            max_prompt_size: 400_000,
            max_tokens: 16_384,
            temperature: 0.2,
            output: PathBuf::from("Migration_Plan.md"),
            log_level: "info".to_string(),
            retry_attempts: 0,
            retry_base_delay_ms: 2_000,
            retry_jitter: 0.25,
        }
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = vec![
            EnvGuard::unset("MIGRATION_PLANNER_PROVIDER"),
            EnvGuard::unset("MIGRATION_PLANNER_MODEL"),
            EnvGuard::unset("MIGRATION_PLANNER_REQUEST_TIMEOUT"),
            EnvGuard::unset("MIGRATION_PLANNER_MAX_PROMPT_SIZE"),
            EnvGuard::unset("MIGRATION_PLANNER_OUTPUT"),
            EnvGuard::unset("MIGRATION_PLANNER_RETRIES"),
            EnvGuard::set("MIGRATION_PLANNER_LOG_LEVEL", DEFAULT_LOG_LEVEL),
        ];

        let config = PlannerConfig::default();

        assert_eq!(config.provider, AdapterKind::OpenAI);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.max_prompt_size, DEFAULT_MAX_PROMPT_SIZE);
        assert_eq!(config.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(config.retry_attempts, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _guards = vec![
            EnvGuard::set("MIGRATION_PLANNER_PROVIDER", "Anthropic"),
            EnvGuard::set("MIGRATION_PLANNER_MODEL", "claude-sonnet-4"),
            EnvGuard::set("MIGRATION_PLANNER_LOG_LEVEL", "DEBUG"),
            EnvGuard::set("MIGRATION_PLANNER_REQUEST_TIMEOUT", "60"),
            EnvGuard::set("MIGRATION_PLANNER_MAX_PROMPT_SIZE", "2048"),
            EnvGuard::set("MIGRATION_PLANNER_OUTPUT", "out/report.md"),
            EnvGuard::set("MIGRATION_PLANNER_RETRIES", "3"),
        ];

        let config = PlannerConfig::default();

        assert_eq!(config.provider, AdapterKind::Anthropic);
        assert_eq!(config.model, "claude-sonnet-4");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.max_prompt_size, 2048);
        assert_eq!(config.output, PathBuf::from("out/report.md"));
        assert_eq!(config.retry_attempts, 3);
    }

    #[test]
    #[serial]
    fn test_unparseable_values_fall_back() {
        let _guards = vec![
            EnvGuard::set("MIGRATION_PLANNER_PROVIDER", "carrier-pigeon"),
            EnvGuard::set("MIGRATION_PLANNER_REQUEST_TIMEOUT", "soon"),
        ];

        let config = PlannerConfig::default();
        assert_eq!(config.provider, AdapterKind::OpenAI);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_validation_ranges() {
        assert!(base_config().validate().is_ok());

        let mut config = base_config();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.request_timeout_secs = 1801;
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.max_prompt_size = 100;
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.temperature = 2.5;
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.retry_jitter = 1.5;
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.model = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retry_attempts_bounded() {
        let mut config = base_config();
        config.retry_attempts = MAX_RETRY_ATTEMPTS;
        assert!(config.validate().is_ok());

        config.retry_attempts = MAX_RETRY_ATTEMPTS + 1;
        assert!(config.validate().is_err());

        config.retry_attempts = u32::MAX;
        assert!(config.validate().is_err());
        assert_eq!(config.retry_policy().max_attempts, u32::MAX);
    }

    #[test]
    fn test_parse_provider() {
        assert_eq!(parse_provider("OpenAI").unwrap(), AdapterKind::OpenAI);
        assert_eq!(parse_provider("ollama").unwrap(), AdapterKind::Ollama);
        assert!(matches!(
            parse_provider("nope"),
            Err(ConfigError::InvalidProvider(_))
        ));
    }

    #[test]
    fn test_pipeline_config_and_retry_policy() {
        let mut config = base_config();
        config.retry_attempts = 2;

        let pipeline = config.pipeline_config();
        assert_eq!(pipeline.model, "gpt-4.1");
        assert_eq!(pipeline.size_limit, 400_000);
        assert_eq!(pipeline.max_tokens, Some(16_384));

        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(2_000));
    }

    #[test]
    fn test_config_display() {
        let display = format!("{}", base_config());
        assert!(display.contains("Migration Planner Configuration:"));
        assert!(display.contains("Provider: openai"));
        assert!(display.contains("Output: Migration_Plan.md"));
    }
}
