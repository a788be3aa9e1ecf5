//! Secret providers and the chain builder.
//!
//! Default chain order: `[DotenvSecretProvider, EnvSecretProvider]`. The
//! `.env` file wins over the process environment, so a key edited in the
//! file takes effect without re-exporting it in the shell.

pub mod dotenv;
pub mod env;

use std::path::Path;

use sdr_core::secret::{SecretChain, SecretProvider};

use self::dotenv::DotenvSecretProvider;
use self::env::EnvSecretProvider;

/// Build the default secret resolution chain.
///
/// A missing `.env` file is not an error; the chain then resolves from the
/// environment alone. A `.env` file that exists but cannot be parsed is
/// logged and skipped.
pub fn build_secret_chain(dotenv_path: &Path) -> SecretChain {
    let mut chain: Vec<Box<dyn SecretProvider>> = Vec::new();

    match DotenvSecretProvider::load(dotenv_path) {
        Ok(Some(provider)) => {
            tracing::debug!(
                path = %dotenv_path.display(),
                keys = provider.len(),
                "Loaded .env file"
            );
            chain.push(Box::new(provider));
        }
        Ok(None) => {
            tracing::debug!(path = %dotenv_path.display(), "No .env file found");
        }
        Err(e) => {
            tracing::warn!(path = %dotenv_path.display(), error = %e, "Ignoring unreadable .env file");
        }
    }

    chain.push(Box::new(EnvSecretProvider::new()));
    SecretChain::new(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn dotenv_file_wins_over_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "PATH=from-dotenv\n").unwrap();

        let chain = build_secret_chain(&path);
        let value = chain.get("PATH").unwrap();
        assert_eq!(value.expose_secret(), "from-dotenv");
    }

    #[test]
    fn missing_dotenv_falls_back_to_environment() {
        let dir = tempfile::tempdir().unwrap();
        let chain = build_secret_chain(&dir.path().join(".env"));
        // PATH is set in every test environment.
        assert!(chain.get("PATH").is_some());
        assert!(chain.get("SDR_TEST_DEFINITELY_UNSET_9F2").is_none());
    }
}
