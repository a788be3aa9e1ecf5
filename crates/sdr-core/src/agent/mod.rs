//! Sales agents and the roster they are drawn up in.
//!
//! A sales agent is one persona bound to one provider's model. Agents are
//! numbered from 1 provider by provider (every persona for the first
//! provider, then every persona for the next), and each gets a tool name
//! of the form `sales_agent{n}_{model}` with the model sanitized.

pub mod prompts;
pub mod runner;

use serde::Serialize;

use sdr_types::agent::Persona;
use sdr_types::llm::ProviderConfig;

use crate::llm::registry::ProviderRegistry;

/// One persona bound to one provider model.
#[derive(Debug, Clone, Serialize)]
pub struct SalesAgent {
    /// 1-based position in the roster.
    pub index: usize,
    pub persona: Persona,
    pub provider: String,
    pub model: String,
    pub tool_name: String,
}

/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
pub fn sanitize_tool_name(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Tool name for the agent at `index` running `model`.
pub fn tool_name(index: usize, model: &str) -> String {
    format!("sales_agent{index}_{}", sanitize_tool_name(model))
}

/// Build the roster from the configured providers and personas.
///
/// Providers missing from the registry (no API key) are skipped, and the
/// numbering stays contiguous over the agents that remain.
pub fn build_roster(
    providers: &[ProviderConfig],
    personas: &[Persona],
    registry: &ProviderRegistry,
) -> Vec<SalesAgent> {
    plan_roster(providers, personas, |p| registry.contains(&p.name))
}

/// Roster over the providers for which `available` holds.
pub fn plan_roster(
    providers: &[ProviderConfig],
    personas: &[Persona],
    available: impl Fn(&ProviderConfig) -> bool,
) -> Vec<SalesAgent> {
    let mut roster = Vec::with_capacity(providers.len() * personas.len());
    for provider in providers.iter().filter(|p| available(p)) {
        for persona in personas {
            let index = roster.len() + 1;
            roster.push(SalesAgent {
                index,
                persona: persona.clone(),
                provider: provider.name.clone(),
                model: provider.model.clone(),
                tool_name: tool_name(index, &provider.model),
            });
        }
    }
    roster
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockProvider, registry_with};
    use sdr_types::agent::default_personas;
    use sdr_types::config::default_providers;

    #[test]
    fn sanitize_replaces_disallowed_characters() {
        assert_eq!(sanitize_tool_name("gpt-4o-mini"), "gpt-4o-mini");
        assert_eq!(sanitize_tool_name("llama-3.3-70b-versatile"), "llama-3_3-70b-versatile");
        assert_eq!(sanitize_tool_name("models/gemini 2.0"), "models_gemini_2_0");
        assert_eq!(sanitize_tool_name("ünïcode"), "_n_code");
    }

    #[test]
    fn roster_is_provider_major_with_all_providers() {
        let registry = registry_with(vec![
            MockProvider::fixed("openai", "gpt-4o-mini", ""),
            MockProvider::fixed("deepseek", "deepseek-chat", ""),
            MockProvider::fixed("gemini", "gemini-2.0-flash", ""),
            MockProvider::fixed("groq", "llama-3.3-70b-versatile", ""),
        ]);
        let roster = build_roster(&default_providers(), &default_personas(), &registry);

        assert_eq!(roster.len(), 12);
        assert_eq!(roster[0].tool_name, "sales_agent1_gpt-4o-mini");
        assert_eq!(roster[2].persona.name, "Busy Sales Agent");
        assert_eq!(roster[3].tool_name, "sales_agent4_deepseek-chat");
        assert_eq!(roster[6].tool_name, "sales_agent7_gemini-2_0-flash");
        assert_eq!(roster[11].tool_name, "sales_agent12_llama-3_3-70b-versatile");
        assert_eq!(roster[11].provider, "groq");
    }

    #[test]
    fn roster_skips_unregistered_providers_and_renumbers() {
        let registry = registry_with(vec![
            MockProvider::fixed("openai", "gpt-4o-mini", ""),
            MockProvider::fixed("groq", "llama-3.3-70b-versatile", ""),
        ]);
        let roster = build_roster(&default_providers(), &default_personas(), &registry);

        assert_eq!(roster.len(), 6);
        assert_eq!(roster[3].index, 4);
        assert_eq!(roster[3].tool_name, "sales_agent4_llama-3_3-70b-versatile");
    }

    #[test]
    fn plan_roster_with_predicate() {
        let roster = plan_roster(&default_providers(), &default_personas(), |p| p.name == "gemini");
        assert_eq!(roster.len(), 3);
        assert_eq!(roster[0].tool_name, "sales_agent1_gemini-2_0-flash");
    }

    #[test]
    fn roster_empty_without_providers() {
        let registry = registry_with(vec![]);
        assert!(build_roster(&default_providers(), &default_personas(), &registry).is_empty());
    }
}
