//! Secret store configuration
//!
//! The credential pair is fetched from an external secret store first and
//! the environment second. The store is addressed either by a mounted secret
//! file (JSON payload `{"db_user": ..., "db_pass": ...}`) or left unset, in
//! which case `DB_USER`/`DB_PASS` are read directly.

use serde::Deserialize;
use std::path::Path;

use super::error::ValidationError;

/// Secret store configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecretsConfig {
    /// Path to the mounted secret payload, if a secret store is in use
    pub secret_file: Option<String>,

    /// Secret name inside the external store (informational, used in logs)
    pub secret_name: Option<String>,
}

impl SecretsConfig {
    /// Validate secrets configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(path) = &self.secret_file {
            if !Path::new(path).exists() {
                return Err(ValidationError::SecretFileMissing(path.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_secret_file_is_valid() {
        let config = SecretsConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_secret_file_path_is_rejected() {
        let config = SecretsConfig {
            secret_file: Some("/nonexistent/secret.json".to_string()),
            secret_name: None,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn existing_secret_file_passes_validation() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = SecretsConfig {
            secret_file: Some(file.path().to_string_lossy().to_string()),
            secret_name: Some("airline-ops/db".to_string()),
        };
        assert!(config.validate().is_ok());
    }
}
