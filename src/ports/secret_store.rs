//! Port for DB credential retrieval.

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

/// The credential pair the database adapter needs.
#[derive(Debug, Clone)]
pub struct DbCredentials {
    pub user: String,
    pub password: SecretString,
}

#[derive(Debug, Error)]
pub enum SecretStoreError {
    #[error("secret payload unreadable: {0}")]
    Unreadable(String),

    #[error("secret payload malformed: {0}")]
    Malformed(String),

    #[error("no credentials available from secret store or environment")]
    NotFound,
}

/// Fetches credentials from the external store first and the environment
/// second. Implementations cache for the process lifetime.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn db_credentials(&self) -> Result<DbCredentials, SecretStoreError>;
}
