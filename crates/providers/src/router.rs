//! Provider router — selects the completion provider based on config.

use crate::openai_compat::OpenAiCompatProvider;
use homie_core::provider::Provider;
use std::collections::HashMap;
use std::sync::Arc;

/// Routes completion requests to the configured provider.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    /// Create a new router with a default provider name.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// List all registered provider names.
    pub fn list(&self) -> Vec<&str> {
        self.providers.keys().map(|s| s.as_str()).collect()
    }
}

/// Build the router from configuration.
///
/// The configured provider is always registered, with either the configured
/// base URL or the well-known default for its name.
pub fn build_from_config(config: &homie_config::AppConfig) -> ProviderRouter {
    let mut router = ProviderRouter::new(&config.provider);

    let api_key = config.api_key.clone().unwrap_or_default();
    let base_url = config
        .provider_url
        .clone()
        .unwrap_or_else(|| default_base_url(&config.provider));

    router.register(
        config.provider.clone(),
        Arc::new(OpenAiCompatProvider::new(&config.provider, &base_url, &api_key)),
    );

    router
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openai" => "https://api.openai.com/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_register_and_lookup() {
        let mut router = ProviderRouter::new("openai");
        let provider = Arc::new(OpenAiCompatProvider::openai("sk-test"));
        router.register("openai", provider);

        assert!(router.get("openai").is_some());
        assert!(router.get("nonexistent").is_none());
        assert!(router.default().is_some());
    }

    #[test]
    fn default_base_urls() {
        assert!(default_base_url("openai").contains("api.openai.com"));
        assert!(default_base_url("ollama").contains("localhost:11434"));
    }

    #[test]
    fn build_from_default_config() {
        let config = homie_config::AppConfig::default();
        let router = build_from_config(&config);
        assert!(router.default().is_some());
        assert_eq!(router.list(), vec!["openai"]);
    }

    #[test]
    fn provider_url_override_respected() {
        let config = homie_config::AppConfig {
            provider_url: Some("http://localhost:8000/v1".into()),
            ..Default::default()
        };
        let router = build_from_config(&config);
        assert!(router.default().is_some());
    }
}
