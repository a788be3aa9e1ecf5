//! Provider registry for runtime provider lookup.
//!
//! A name-indexed registry of boxed LLM providers. Registration order is
//! kept because the sales roster numbers its agents provider by provider.

use std::collections::HashMap;

use super::box_provider::BoxLlmProvider;

/// Registry of available LLM providers, indexed by name.
pub struct ProviderRegistry {
    providers: HashMap<String, BoxLlmProvider>,
    order: Vec<String>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a provider under the given name.
    ///
    /// If a provider with this name already exists, it is replaced in place.
    pub fn register(&mut self, name: impl Into<String>, provider: BoxLlmProvider) {
        let name = name.into();
        if !self.providers.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.providers.insert(name, provider);
    }

    /// Look up a provider by name.
    pub fn get(&self, name: &str) -> Option<&BoxLlmProvider> {
        self.providers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Registered provider names, in registration order.
    pub fn list_names(&self) -> Vec<&str> {
        self.order.iter().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockProvider;

    #[test]
    fn register_keeps_insertion_order() {
        let mut registry = ProviderRegistry::new();
        registry.register("openai", BoxLlmProvider::new(MockProvider::fixed("openai", "gpt-4o-mini", "hi")));
        registry.register("groq", BoxLlmProvider::new(MockProvider::fixed("groq", "llama", "hi")));
        registry.register("deepseek", BoxLlmProvider::new(MockProvider::fixed("deepseek", "deepseek-chat", "hi")));

        assert_eq!(registry.list_names(), vec!["openai", "groq", "deepseek"]);
        assert_eq!(registry.len(), 3);
        assert!(registry.contains("groq"));
        assert!(registry.get("gemini").is_none());
    }

    #[test]
    fn register_replaces_existing_without_reordering() {
        let mut registry = ProviderRegistry::new();
        registry.register("openai", BoxLlmProvider::new(MockProvider::fixed("openai", "gpt-4o-mini", "a")));
        registry.register("groq", BoxLlmProvider::new(MockProvider::fixed("groq", "llama", "b")));
        registry.register("openai", BoxLlmProvider::new(MockProvider::fixed("openai", "gpt-4o", "c")));

        assert_eq!(registry.list_names(), vec!["openai", "groq"]);
        assert_eq!(registry.get("openai").unwrap().model(), "gpt-4o");
    }
}
