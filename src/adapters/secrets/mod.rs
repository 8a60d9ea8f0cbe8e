//! Secret store adapter.
//!
//! Credentials come from a mounted JSON secret file when one is configured,
//! falling back to the `DB_USER`/`DB_PASS` environment variables. The
//! resolved pair is cached for the process lifetime.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::config::SecretsConfig;
use crate::ports::{DbCredentials, SecretStore, SecretStoreError};

#[derive(Debug, Deserialize)]
struct SecretPayload {
    db_user: String,
    db_pass: String,
}

/// File-backed secret store with environment fallback.
pub struct FileSecretStore {
    config: SecretsConfig,
    cached: OnceCell<DbCredentials>,
}

impl FileSecretStore {
    pub fn new(config: SecretsConfig) -> Self {
        Self { config, cached: OnceCell::new() }
    }

    fn from_file(path: &str) -> Result<DbCredentials, SecretStoreError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SecretStoreError::Unreadable(format!("{}: {}", path, e)))?;
        let payload: SecretPayload = serde_json::from_str(&raw)
            .map_err(|e| SecretStoreError::Malformed(e.to_string()))?;
        Ok(DbCredentials {
            user: payload.db_user,
            password: SecretString::new(payload.db_pass),
        })
    }

    fn from_env() -> Result<DbCredentials, SecretStoreError> {
        let user = std::env::var("DB_USER").ok();
        let pass = std::env::var("DB_PASS").ok();
        match (user, pass) {
            (Some(user), Some(pass)) => Ok(DbCredentials {
                user,
                password: SecretString::new(pass),
            }),
            _ => Err(SecretStoreError::NotFound),
        }
    }

    fn resolve(&self) -> Result<DbCredentials, SecretStoreError> {
        match &self.config.secret_file {
            Some(path) => {
                let secret_name = self.config.secret_name.as_deref().unwrap_or("db");
                tracing::debug!(secret_name, "loading database credentials from secret file");
                Self::from_file(path)
            }
            None => Self::from_env(),
        }
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn db_credentials(&self) -> Result<DbCredentials, SecretStoreError> {
        self.cached
            .get_or_try_init(|| async { self.resolve() })
            .await
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;

    #[tokio::test]
    async fn reads_credentials_from_secret_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"db_user": "ops", "db_pass": "hunter2"}}"#).unwrap();
        let store = FileSecretStore::new(SecretsConfig {
            secret_file: Some(file.path().to_string_lossy().to_string()),
            secret_name: Some("airline-ops/db".to_string()),
        });
        let creds = store.db_credentials().await.unwrap();
        assert_eq!(creds.user, "ops");
        assert_eq!(creds.password.expose_secret(), "hunter2");
    }

    #[tokio::test]
    async fn malformed_payload_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let store = FileSecretStore::new(SecretsConfig {
            secret_file: Some(file.path().to_string_lossy().to_string()),
            secret_name: None,
        });
        let err = store.db_credentials().await.unwrap_err();
        assert!(matches!(err, SecretStoreError::Malformed(_)));
    }

    #[tokio::test]
    async fn caches_after_first_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"db_user": "ops", "db_pass": "hunter2"}}"#).unwrap();
        let path = file.path().to_string_lossy().to_string();
        let store = FileSecretStore::new(SecretsConfig {
            secret_file: Some(path),
            secret_name: None,
        });
        store.db_credentials().await.unwrap();
        drop(file);
        // The file is gone, the cached pair still serves.
        let creds = store.db_credentials().await.unwrap();
        assert_eq!(creds.user, "ops");
    }
}
