//! Store configuration.

/// Similarity threshold used by fuzzy relate when neither the call nor
/// the store configures one.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Default name of the physical document table.
pub const DEFAULT_TABLE_NAME: &str = "documents";

/// Configuration for opening a store.
#[derive(Debug, Clone)]
pub struct Config {
    /// Store-level fuzzy relate threshold. `None` falls back to
    /// [`DEFAULT_SIMILARITY_THRESHOLD`].
    pub default_threshold: Option<f64>,

    /// Reject unknown `$`-prefixed keys inside operator objects instead of
    /// comparing the whole object literally.
    pub strict_filters: bool,

    /// Name of the physical table holding every collection.
    pub table_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_threshold: None,
            strict_filters: false,
            table_name: DEFAULT_TABLE_NAME.to_string(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the store-level fuzzy relate threshold.
    #[must_use]
    pub const fn default_threshold(mut self, threshold: f64) -> Self {
        self.default_threshold = Some(threshold);
        self
    }

    /// Sets strict filter parsing.
    #[must_use]
    pub const fn strict_filters(mut self, value: bool) -> Self {
        self.strict_filters = value;
        self
    }

    /// Sets the physical table name.
    ///
    /// The name is validated like a field name when the store opens.
    #[must_use]
    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = name.into();
        self
    }

    /// Returns the threshold fuzzy relate uses when the call gives none.
    pub fn effective_threshold(&self) -> f64 {
        self.default_threshold
            .unwrap_or(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.default_threshold.is_none());
        assert!(!config.strict_filters);
        assert_eq!(config.table_name, "documents");
        assert_eq!(config.effective_threshold(), DEFAULT_SIMILARITY_THRESHOLD);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .default_threshold(0.6)
            .strict_filters(true)
            .table_name("tenant_docs");

        assert_eq!(config.default_threshold, Some(0.6));
        assert!(config.strict_filters);
        assert_eq!(config.table_name, "tenant_docs");
        assert_eq!(config.effective_threshold(), 0.6);
    }
}
