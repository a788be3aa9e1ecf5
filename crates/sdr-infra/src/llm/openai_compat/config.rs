//! Per-provider defaults for the OpenAI-compatible endpoints the campaign
//! drafts with.

use secrecy::SecretString;

use sdr_types::llm::ProviderCapabilities;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Everything [`super::OpenAiCompatibleProvider::new`] needs.
pub struct OpenAiCompatConfig {
    /// Short provider name (e.g., "openai", "groq").
    pub provider_name: String,
    pub base_url: String,
    pub api_key: SecretString,
    /// Default model, used when a request leaves the model empty.
    pub model: String,
    pub capabilities: ProviderCapabilities,
}

impl OpenAiCompatConfig {
    fn hosted(
        provider_name: &str,
        base_url: &str,
        api_key: SecretString,
        model: &str,
        context: u32,
        output: u32,
    ) -> Self {
        Self {
            provider_name: provider_name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
            capabilities: ProviderCapabilities {
                tool_calling: true,
                max_context_tokens: context,
                max_output_tokens: output,
            },
        }
    }
}

pub fn openai_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig::hosted("openai", OPENAI_BASE_URL, api_key, model, 128_000, 16_384)
}

pub fn deepseek_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig::hosted("deepseek", DEEPSEEK_BASE_URL, api_key, model, 64_000, 8_192)
}

/// Gemini through its OpenAI-compatible beta endpoint.
pub fn gemini_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig::hosted("gemini", GEMINI_BASE_URL, api_key, model, 1_048_576, 8_192)
}

pub fn groq_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig::hosted("groq", GROQ_BASE_URL, api_key, model, 131_072, 32_768)
}

/// Any other OpenAI-compatible endpoint. Tool calling is not assumed.
pub fn custom_defaults(
    provider_name: &str,
    base_url: &str,
    api_key: SecretString,
    model: &str,
) -> OpenAiCompatConfig {
    let mut config =
        OpenAiCompatConfig::hosted(provider_name, base_url, api_key, model, 32_768, 4_096);
    config.capabilities.tool_calling = false;
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn key() -> SecretString {
        SecretString::from("sk-test".to_string())
    }

    #[test]
    fn test_openai_defaults() {
        let config = openai_defaults(key(), "gpt-4o-mini");
        assert_eq!(config.provider_name, "openai");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.api_key.expose_secret(), "sk-test");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.capabilities.max_context_tokens, 128_000);
    }

    #[test]
    fn test_deepseek_defaults() {
        let config = deepseek_defaults(key(), "deepseek-chat");
        assert_eq!(config.provider_name, "deepseek");
        assert_eq!(config.base_url, "https://api.deepseek.com/v1");
    }

    #[test]
    fn test_gemini_defaults() {
        let config = gemini_defaults(key(), "gemini-2.0-flash");
        assert_eq!(config.provider_name, "gemini");
        assert!(config.base_url.contains("generativelanguage.googleapis.com"));
        assert!(config.base_url.ends_with("/v1beta/openai"));
        assert_eq!(config.capabilities.max_context_tokens, 1_048_576);
    }

    #[test]
    fn test_groq_defaults() {
        let config = groq_defaults(key(), "llama-3.3-70b-versatile");
        assert_eq!(config.provider_name, "groq");
        assert_eq!(config.base_url, "https://api.groq.com/openai/v1");
    }

    #[test]
    fn test_custom_defaults_trims_trailing_slash() {
        let config = custom_defaults("local", "http://localhost:8080/v1/", key(), "qwen");
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert!(!config.capabilities.tool_calling);
    }
}
