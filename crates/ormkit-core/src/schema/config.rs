//! Schema generation configuration.

/// Default for [`SchemaConfig::safe`].
pub const DEFAULT_SAFE: bool = true;

/// Options controlling DDL output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaConfig {
    /// Emit `IF NOT EXISTS` on table and index creation.
    pub safe: bool,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self { safe: DEFAULT_SAFE }
    }
}

impl SchemaConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether creation statements are guarded with `IF NOT EXISTS`.
    pub fn with_safe(mut self, safe: bool) -> Self {
        self.safe = safe;
        self
    }

    /// The `IF NOT EXISTS ` prefix, or nothing.
    pub fn exists_clause(&self) -> &'static str {
        if self.safe {
            "IF NOT EXISTS "
        } else {
            ""
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchemaConfig::default();
        assert!(config.safe);
        assert_eq!(config.exists_clause(), "IF NOT EXISTS ");
    }

    #[test]
    fn test_unsafe_config() {
        let config = SchemaConfig::new().with_safe(false);
        assert_eq!(config.exists_clause(), "");
    }
}
