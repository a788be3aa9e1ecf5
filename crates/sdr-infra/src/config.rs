//! Configuration loader for the SDR pipeline.
//!
//! Reads `sdr.toml` and deserializes it into [`SdrConfig`]. A missing file
//! yields the defaults; a file that exists but does not parse is an error,
//! since falling back to defaults could send mail to the wrong place.

use std::collections::HashSet;
use std::path::Path;

use sdr_core::secret::SecretChain;
use sdr_types::config::SdrConfig;
use sdr_types::error::ConfigError;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "sdr.toml";

pub const ENV_USAGE_LOG_FILE: &str = "CSV_LOG_FILE";
pub const ENV_FROM_EMAIL: &str = "SDR_FROM_EMAIL";
pub const ENV_TO_EMAIL: &str = "SDR_TO_EMAIL";

/// Load the configuration at `path`.
///
/// - Missing file: [`SdrConfig::default()`].
/// - Unreadable or malformed file: [`ConfigError`].
pub async fn load_config(path: &Path) -> Result<SdrConfig, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            return Ok(SdrConfig::default());
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                message: err.to_string(),
            });
        }
    };

    toml::from_str::<SdrConfig>(&content).map_err(|err| ConfigError::Parse {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

/// Apply `CSV_LOG_FILE`, `SDR_FROM_EMAIL` and `SDR_TO_EMAIL` from the
/// secret chain (`.env` first, then the environment).
pub fn apply_env_overrides(config: &mut SdrConfig, secrets: &SecretChain) {
    if let Some(path) = secrets.get_plain(ENV_USAGE_LOG_FILE) {
        config.usage_log_file = path;
    }
    if let Some(from) = secrets.get_plain(ENV_FROM_EMAIL) {
        config.from_email = Some(from);
    }
    if let Some(to) = secrets.get_plain(ENV_TO_EMAIL) {
        config.to_email = Some(to);
    }
}

/// Reject configurations that cannot produce a run.
pub fn validate(config: &SdrConfig) -> Result<(), ConfigError> {
    if config.providers.is_empty() {
        return Err(ConfigError::Invalid("no providers configured".into()));
    }
    if config.personas.is_empty() {
        return Err(ConfigError::Invalid("no personas configured".into()));
    }
    let mut seen = HashSet::new();
    for provider in &config.providers {
        if provider.name.trim().is_empty() || provider.model.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "every provider needs a name and a model".into(),
            ));
        }
        if !seen.insert(provider.name.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "provider '{}' is listed twice",
                provider.name
            )));
        }
    }
    if !seen.contains(config.manager.provider.as_str()) {
        return Err(ConfigError::Invalid(format!(
            "manager provider '{}' is not among the configured providers",
            config.manager.provider
        )));
    }
    if !(config.usd_to_gbp.is_finite() && config.usd_to_gbp > 0.0) {
        return Err(ConfigError::Invalid("usd_to_gbp must be positive".into()));
    }
    if config.max_tokens == 0 {
        return Err(ConfigError::Invalid("max_tokens must be positive".into()));
    }
    if let Some(t) = config.temperature {
        if !(0.0..=2.0).contains(&t) {
            return Err(ConfigError::Invalid(format!(
                "temperature {t} is outside 0.0..=2.0"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdr_core::secret::SecretProvider;
    use sdr_types::config::BodyFormat;
    use secrecy::SecretString;
    use tempfile::TempDir;

    struct Fixed(Vec<(&'static str, &'static str)>);

    impl SecretProvider for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn get(&self, key: &str) -> Option<SecretString> {
            self.0
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| SecretString::from(v.to_string()))
        }
    }

    #[tokio::test]
    async fn missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("sdr.toml")).await.unwrap();
        assert_eq!(config.workflow_name, "Automated SDR");
        assert_eq!(config.providers.len(), 4);
    }

    #[tokio::test]
    async fn valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sdr.toml");
        tokio::fs::write(
            &path,
            r#"
company = "Acme"
sender_name = "Alice"
body_format = "plain"
usd_to_gbp = 0.8

[manager]
provider = "groq"
model = "llama-3.3-70b-versatile"

[[providers]]
name = "groq"
model = "llama-3.3-70b-versatile"
api_key_env = "GROQ_API_KEY"
required = true

[[provider_pricing]]
provider_name = "groq"
model_pattern = "llama"
input_cost_per_million = 0.5
output_cost_per_million = 0.8
"#,
        )
        .await
        .unwrap();

        let config = load_config(&path).await.unwrap();
        assert_eq!(config.company, "Acme");
        assert_eq!(config.body_format, BodyFormat::Plain);
        assert_eq!(config.providers.len(), 1);
        assert!(config.providers[0].required);
        assert_eq!(config.manager.provider, "groq");
        assert_eq!(config.provider_pricing.len(), 1);
        // Untouched fields keep their defaults.
        assert_eq!(config.personas.len(), 3);
        assert_eq!(config.usage_log_file, "usage_log.csv");
        assert!(validate(&config).is_ok());
    }

    #[tokio::test]
    async fn invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sdr.toml");
        tokio::fs::write(&path, "this is not { valid toml !!!").await.unwrap();

        let err = load_config(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn env_overrides_apply() {
        let chain = SecretChain::new(vec![Box::new(Fixed(vec![
            ("CSV_LOG_FILE", "logs/usage.csv"),
            ("SDR_TO_EMAIL", "ceo@example.test"),
            ("SDR_FROM_EMAIL", " "),
        ]))]);
        let mut config = SdrConfig {
            from_email: Some("sales@complai.test".into()),
            ..SdrConfig::default()
        };
        apply_env_overrides(&mut config, &chain);

        assert_eq!(config.usage_log_file, "logs/usage.csv");
        assert_eq!(config.to_email.as_deref(), Some("ceo@example.test"));
        // Blank values do not override.
        assert_eq!(config.from_email.as_deref(), Some("sales@complai.test"));
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(validate(&SdrConfig::default()).is_ok());

        let mut config = SdrConfig::default();
        config.manager.provider = "anthropic".into();
        assert!(validate(&config).is_err());

        let mut config = SdrConfig::default();
        config.providers.push(config.providers[0].clone());
        assert!(validate(&config).unwrap_err().to_string().contains("listed twice"));

        let config = SdrConfig {
            usd_to_gbp: 0.0,
            ..SdrConfig::default()
        };
        assert!(validate(&config).is_err());

        let config = SdrConfig {
            personas: Vec::new(),
            ..SdrConfig::default()
        };
        assert!(validate(&config).is_err());

        let config = SdrConfig {
            temperature: Some(3.5),
            ..SdrConfig::default()
        };
        assert!(validate(&config).is_err());
    }
}
