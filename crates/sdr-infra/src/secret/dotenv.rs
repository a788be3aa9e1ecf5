//! `.env` file secret provider.
//!
//! The file is parsed once with `dotenvy` into an in-memory map. Nothing is
//! written back into the process environment.

use std::collections::HashMap;
use std::path::Path;

use secrecy::SecretString;

use sdr_core::secret::SecretProvider;

/// Secrets read from a `.env` file.
pub struct DotenvSecretProvider {
    values: HashMap<String, String>,
}

impl DotenvSecretProvider {
    /// Parse `path`. Returns `Ok(None)` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>, dotenvy::Error> {
        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let values = iter.collect::<Result<HashMap<_, _>, _>>()?;
        Ok(Some(Self { values }))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SecretProvider for DotenvSecretProvider {
    fn name(&self) -> &str {
        "dotenv"
    }

    fn get(&self, key: &str) -> Option<SecretString> {
        self.values.get(key).map(|v| SecretString::from(v.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn parses_quoted_and_commented_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "# keys\nOPENAI_API_KEY=sk-proj-123\nSDR_TO_EMAIL=\"ceo@example.test\"\n",
        )
        .unwrap();

        let provider = DotenvSecretProvider::load(&path).unwrap().unwrap();
        assert_eq!(provider.len(), 2);
        assert_eq!(provider.get("OPENAI_API_KEY").unwrap().expose_secret(), "sk-proj-123");
        assert_eq!(provider.get("SDR_TO_EMAIL").unwrap().expose_secret(), "ceo@example.test");
        assert!(provider.get("GROQ_API_KEY").is_none());
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DotenvSecretProvider::load(&dir.path().join(".env")).unwrap().is_none());
    }

    #[test]
    fn malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "NOT A VALID LINE WITH 'unclosed\n").unwrap();
        assert!(DotenvSecretProvider::load(&path).is_err());
    }
}
