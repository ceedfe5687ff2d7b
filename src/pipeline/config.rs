/// Settings threaded through both stages
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub model: String,
    /// Prompt limit in characters
    pub size_limit: usize,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4.1".to_string(),
            size_limit: 400_000,
            temperature: Some(0.2),
            max_tokens: Some(16_384),
        }
    }
}

impl PipelineConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_size_limit(mut self, size_limit: usize) -> Self {
        self.size_limit = size_limit;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.model, "gpt-4.1");
        assert_eq!(config.size_limit, 400_000);
        assert_eq!(config.max_tokens, Some(16_384));
    }

    #[test]
    fn test_builder_pattern() {
        let config = PipelineConfig::new("o3")
            .with_size_limit(2_048)
            .with_temperature(0.0)
            .with_max_tokens(512);

        assert_eq!(config.model, "o3");
        assert_eq!(config.size_limit, 2_048);
        assert_eq!(config.temperature, Some(0.0));
        assert_eq!(config.max_tokens, Some(512));
    }
}
