//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `AERODESK` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use aerodesk::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod secrets;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use secrets::SecretsConfig;
pub use server::ServerConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, request budget)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection and pool)
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Secret store configuration (DB credentials)
    #[serde(default)]
    pub secrets: SecretsConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Reads `.env` if present, then environment variables with the
    /// `AERODESK` prefix; `AERODESK__DATABASE__HOST=db` maps to
    /// `database.host = "db"`.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("AERODESK")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.secrets.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global; serialize the tests that touch them.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        env::remove_var("AERODESK__DATABASE__HOST");
        env::remove_var("AERODESK__DATABASE__NAME");
        env::remove_var("AERODESK__SERVER__PORT");
    }

    #[test]
    fn load_with_no_env_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().expect("defaults should load");
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.server.port, 8080);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_reads_nested_env_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("AERODESK__DATABASE__HOST", "db.internal");
        env::set_var("AERODESK__DATABASE__NAME", "ops_test");
        env::set_var("AERODESK__SERVER__PORT", "9090");
        let config = AppConfig::load().expect("overrides should load");
        clear_env();

        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.name, "ops_test");
        assert_eq!(config.server.port, 9090);
    }
}
