use std::fmt;

/// Opaque API credential handed to a client constructor.
///
/// The value never appears in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Reads a non-empty credential from the named environment variable.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(Self)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_debug_is_redacted() {
        let key = ApiKey::new("sk-secret");
        let debug = format!("{:?}", key);
        assert!(!debug.contains("sk-secret"));
        assert_eq!(key.expose(), "sk-secret");
    }

    #[test]
    #[serial]
    fn test_from_env_ignores_blank() {
        std::env::set_var("MIGRATION_PLANNER_TEST_KEY", "   ");
        assert!(ApiKey::from_env("MIGRATION_PLANNER_TEST_KEY").is_none());

        std::env::set_var("MIGRATION_PLANNER_TEST_KEY", " sk-123 ");
        assert_eq!(
            ApiKey::from_env("MIGRATION_PLANNER_TEST_KEY").map(|k| k.expose().to_string()),
            Some("sk-123".to_string())
        );

        std::env::remove_var("MIGRATION_PLANNER_TEST_KEY");
        assert!(ApiKey::from_env("MIGRATION_PLANNER_TEST_KEY").is_none());
    }
}
