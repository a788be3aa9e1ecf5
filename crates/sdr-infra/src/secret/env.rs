//! Secrets from the process environment, the last link of the chain.

use secrecy::SecretString;

use sdr_core::secret::SecretProvider;

/// Process environment lookup. Values that are not valid Unicode are
/// treated as unset.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecretProvider;

impl EnvSecretProvider {
    pub fn new() -> Self {
        Self
    }
}

impl SecretProvider for EnvSecretProvider {
    fn name(&self) -> &str {
        "env"
    }

    fn get(&self, key: &str) -> Option<SecretString> {
        std::env::var(key).ok().map(SecretString::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_var_is_none() {
        let provider = EnvSecretProvider::new();
        assert!(provider.get("SDR_NONEXISTENT_VAR_XYZ_123").is_none());
    }

    #[test]
    fn existing_var_is_found() {
        let provider = EnvSecretProvider::new();
        assert!(provider.get("PATH").is_some());
        assert_eq!(provider.name(), "env");
    }
}
