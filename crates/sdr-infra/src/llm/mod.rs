//! LLM provider construction.
//!
//! [`create_provider`] turns a [`ProviderConfig`] plus its API key into a
//! boxed provider; [`build_registry`] does that for every configured
//! provider, resolving keys through the secret chain.

pub mod openai_compat;
pub mod pricing;

use secrecy::{ExposeSecret, SecretString};

use sdr_core::llm::box_provider::BoxLlmProvider;
use sdr_core::llm::registry::ProviderRegistry;
use sdr_core::secret::SecretProvider;
use sdr_types::llm::{LlmError, ProviderConfig};

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::custom_defaults;

/// Create a [`BoxLlmProvider`] from a [`ProviderConfig`].
///
/// Well-known names (`openai`, `deepseek`, `gemini`, `groq`) get their
/// endpoint defaults; any other name needs a `base_url`. An explicit
/// `base_url` always wins.
///
/// # Errors
///
/// `AuthenticationFailed` when the key is missing or blank,
/// `InvalidRequest` for an unknown name without a `base_url`.
pub fn create_provider(
    config: &ProviderConfig,
    api_key: Option<SecretString>,
) -> Result<BoxLlmProvider, LlmError> {
    let key = api_key
        .filter(|k| !k.expose_secret().trim().is_empty())
        .ok_or(LlmError::AuthenticationFailed)?;

    let provider = match config.base_url.as_deref() {
        Some(base_url) => {
            OpenAiCompatibleProvider::new(custom_defaults(&config.name, base_url, key, &config.model))
        }
        None => match config.name.as_str() {
            "openai" => OpenAiCompatibleProvider::openai(key, &config.model),
            "deepseek" => OpenAiCompatibleProvider::deepseek(key, &config.model),
            "gemini" => OpenAiCompatibleProvider::gemini(key, &config.model),
            "groq" => OpenAiCompatibleProvider::groq(key, &config.model),
            other => {
                return Err(LlmError::InvalidRequest(format!(
                    "provider '{other}' has no base_url and no built-in endpoint"
                )));
            }
        },
    };
    Ok(BoxLlmProvider::new(provider))
}

/// Register every configured provider whose API key is available.
///
/// A missing key on a `required` provider is an error; on an optional one
/// the provider is skipped with a warning and its agents drop out of the
/// roster.
pub fn build_registry(
    configs: &[ProviderConfig],
    secrets: &dyn SecretProvider,
) -> Result<ProviderRegistry, LlmError> {
    let mut registry = ProviderRegistry::new();
    for config in configs {
        let key = secrets.get(&config.api_key_env);
        match create_provider(config, key) {
            Ok(provider) => {
                tracing::debug!(provider = %config.name, model = %config.model, "Registered provider");
                registry.register(config.name.clone(), provider);
            }
            Err(LlmError::AuthenticationFailed) if !config.required => {
                tracing::warn!(
                    provider = %config.name,
                    env_var = %config.api_key_env,
                    "API key not set, skipping provider"
                );
            }
            Err(LlmError::AuthenticationFailed) => {
                return Err(LlmError::InvalidRequest(format!(
                    "{} is required but {} is not set",
                    config.display_label(),
                    config.api_key_env
                )));
            }
            Err(e) => return Err(e),
        }
    }
    Ok(registry)
}
