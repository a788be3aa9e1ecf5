//! Secret lookup and the API key report.
//!
//! `SecretProvider` is implemented in `sdr-infra` by the `.env` file and
//! process-environment providers; `SecretChain` resolves through them in
//! priority order (first match wins).

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use sdr_types::llm::ProviderConfig;

/// Number of leading characters shown when reporting a present key.
const KEY_PREFIX_LEN: usize = 8;

/// Environment variable holding the SendGrid API key.
pub const SENDGRID_API_KEY: &str = "SENDGRID_API_KEY";

/// Trait for read-only secret backends.
pub trait SecretProvider: Send + Sync {
    /// Backend name for logs (e.g., "env", "dotenv").
    fn name(&self) -> &str;

    /// Look up a secret; `None` when this backend does not have it.
    fn get(&self, key: &str) -> Option<SecretString>;
}

/// Ordered list of providers; the first one holding a key wins.
pub struct SecretChain {
    providers: Vec<Box<dyn SecretProvider>>,
}

impl SecretChain {
    pub fn new(providers: Vec<Box<dyn SecretProvider>>) -> Self {
        Self { providers }
    }

    /// Plain-string lookup for non-secret settings that share the same sources
    /// (e.g., `CSV_LOG_FILE`). Empty values count as unset.
    pub fn get_plain(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(|v| v.expose_secret().to_string())
            .filter(|v| !v.trim().is_empty())
    }
}

impl SecretProvider for SecretChain {
    fn name(&self) -> &str {
        "chain"
    }

    fn get(&self, key: &str) -> Option<SecretString> {
        for provider in &self.providers {
            if let Some(value) = provider.get(key) {
                tracing::trace!(key, source = provider.name(), "Resolved secret");
                return Some(value);
            }
        }
        None
    }
}

/// Presence of one API key, safe to print.
#[derive(Debug, Clone, Serialize)]
pub struct KeyStatus {
    /// Display label (e.g., "OpenAI").
    pub label: String,
    /// Environment variable name.
    pub env_var: String,
    pub present: bool,
    pub required: bool,
    /// First characters of the key when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl KeyStatus {
    /// One-line human summary, e.g. "OpenAI API Key exists and begins sk-proj-".
    pub fn summary(&self) -> String {
        match (&self.prefix, self.required) {
            (Some(prefix), _) => format!("{} API Key exists and begins {prefix}", self.label),
            (None, true) => format!("{} API Key not set", self.label),
            (None, false) => format!("{} API Key not set (optional)", self.label),
        }
    }
}

/// Report which provider keys (plus the SendGrid key) are available.
///
/// Missing keys are never an error here; the registry builder and the sender
/// decide what is fatal.
pub fn key_report(providers: &[ProviderConfig], secrets: &dyn SecretProvider) -> Vec<KeyStatus> {
    let mut report: Vec<KeyStatus> = providers
        .iter()
        .map(|p| key_status(p.display_label(), &p.api_key_env, p.required, secrets))
        .collect();
    report.push(key_status("SendGrid", SENDGRID_API_KEY, false, secrets));
    report
}

fn key_status(label: &str, env_var: &str, required: bool, secrets: &dyn SecretProvider) -> KeyStatus {
    // Blank keys count as unset, the same as when building providers.
    let prefix = secrets
        .get(env_var)
        .filter(|v| !v.expose_secret().trim().is_empty())
        .map(|v| v.expose_secret().chars().take(KEY_PREFIX_LEN).collect::<String>());
    KeyStatus {
        label: label.to_string(),
        env_var: env_var.to_string(),
        present: prefix.is_some(),
        required,
        prefix,
    }
}
