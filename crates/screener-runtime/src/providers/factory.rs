//! Backend selection by name.
//!
//! ```ignore
//! let registry = ProviderRegistry::with_defaults();
//! let provider = registry.create("ollama", &serde_json::json!({}))?;
//! let model = registry.default_model("ollama");
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::{validate_base_url, LlmProvider, ProviderError};

/// Builds one kind of backend from its JSON settings.
pub trait ProviderFactory: Send + Sync {
    /// Name used in configuration ("ollama", "openai").
    fn provider_type(&self) -> &'static str;

    /// Model used when the configuration names none.
    fn default_model(&self) -> &'static str;

    /// Reject settings the backend cannot work with.
    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError> {
        validate_base_url(config)
    }

    fn create(&self, config: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError>;
}

/// Factories keyed by provider type.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<&'static str, Box<dyn ProviderFactory>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every backend compiled into this build.
    pub fn with_defaults() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();

        #[cfg(feature = "local")]
        registry.register(super::OllamaProviderFactory);

        #[cfg(feature = "openai")]
        registry.register(super::OpenAiProviderFactory);

        registry
    }

    /// Add a factory; a later one with the same type wins.
    pub fn register(&mut self, factory: impl ProviderFactory + 'static) {
        self.factories.insert(factory.provider_type(), Box::new(factory));
    }

    /// Validate the settings, then build the backend.
    pub fn create(
        &self,
        provider_type: &str,
        config: &JsonValue,
    ) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        let factory = self.lookup(provider_type)?;
        factory.validate_config(config)?;
        factory.create(config)
    }

    pub fn default_model(&self, provider_type: &str) -> Option<&'static str> {
        self.factories.get(provider_type).map(|f| f.default_model())
    }

    pub fn available_types(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    fn lookup(&self, provider_type: &str) -> Result<&dyn ProviderFactory, ProviderError> {
        self.factories
            .get(provider_type)
            .map(Box::as_ref)
            .ok_or_else(|| {
                ProviderError::NotConfigured(format!(
                    "unknown provider '{}' (available: {})",
                    provider_type,
                    self.available_types().join(", ")
                ))
            })
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}
