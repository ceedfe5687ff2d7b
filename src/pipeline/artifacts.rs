use std::fmt;

/// Text produced by the analysis stage. Never parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPlan(String);

impl MigrationPlan {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MigrationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Text produced by the schema stage. Never parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSuggestion(String);

impl SchemaSuggestion {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SchemaSuggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
