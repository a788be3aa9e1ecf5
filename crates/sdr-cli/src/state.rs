//! Application state shared by the commands.

use anyhow::{Context, Result};

use sdr_core::secret::SecretChain;
use sdr_infra::config::{apply_env_overrides, load_config, validate};
use sdr_infra::secret::build_secret_chain;
use sdr_types::config::SdrConfig;

use crate::cli::Cli;

/// Loaded configuration plus the secret chain it was resolved with.
pub struct AppState {
    pub config: SdrConfig,
    pub secrets: SecretChain,
}

impl AppState {
    /// Read `.env`, load and validate the config, apply env overrides.
    pub async fn init(cli: &Cli) -> Result<Self> {
        let secrets = build_secret_chain(&cli.env_file);

        let mut config = load_config(&cli.config)
            .await
            .with_context(|| format!("loading {}", cli.config.display()))?;
        apply_env_overrides(&mut config, &secrets);
        validate(&config).context("checking configuration")?;

        tracing::debug!(
            config = %cli.config.display(),
            providers = config.providers.len(),
            personas = config.personas.len(),
            usage_log = %config.usage_log_file,
            "Configuration loaded"
        );
        Ok(Self { config, secrets })
    }
}
