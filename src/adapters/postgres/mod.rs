//! PostgreSQL adapters - database implementations of the store ports.
//!
//! Every mutating method owns its transaction; callers never see a partial
//! write. Enum columns are stored as text and parsed through the domain
//! `from_str` constructors; money is a (amount, currency) column pair.

mod bookings;
mod flights;
mod insurance;
mod passengers;
mod policies;
mod reference_data;
mod refunds;
mod service_log;
mod trips;

pub use bookings::PgBookingStore;
pub use flights::PgFlightStore;
pub use insurance::PgInsuranceStore;
pub use passengers::PgPassengerStore;
pub use policies::PgPolicyStore;
pub use reference_data::PgReferenceDataStore;
pub use refunds::PgRefundStore;
pub use service_log::PgServiceLogStore;
pub use trips::PgTripStore;

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use crate::config::DatabaseConfig;
use crate::domain::foundation::{DomainError, Money};
use crate::ports::HealthProbe;

/// Builds the connection pool, retrying the initial connection a few times
/// so the service survives the database coming up after it.
pub async fn connect_pool(
    config: &DatabaseConfig,
    url: &SecretString,
) -> Result<PgPool, DomainError> {
    let options = PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs));

    let mut last_err = None;
    for attempt in 1..=config.connect_attempts {
        match options.clone().connect(url.expose_secret()).await {
            Ok(pool) => {
                sqlx::query("SELECT 1").execute(&pool).await.map_err(db_err(
                    "initial connectivity check failed",
                ))?;
                return Ok(pool);
            }
            Err(err) => {
                tracing::warn!(attempt, error = %err, "database connection attempt failed");
                last_err = Some(err);
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
    Err(DomainError::internal(format!(
        "could not connect to database after {} attempts: {}",
        config.connect_attempts,
        last_err.map(|e| e.to_string()).unwrap_or_default()
    )))
}

/// `SELECT 1` liveness probe backing `/health`.
#[derive(Clone)]
pub struct PgHealthProbe {
    pool: PgPool,
}

impl PgHealthProbe {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthProbe for PgHealthProbe {
    async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

/// Maps a sqlx error into an `Internal` domain error with context.
pub(crate) fn db_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> DomainError {
    move |e| DomainError::internal(format!("{}: {}", context, e))
}

/// Parses a text enum column through a domain `from_str` constructor.
pub(crate) fn parse_enum<T>(
    raw: &str,
    parse: fn(&str) -> Option<T>,
    what: &'static str,
) -> Result<T, DomainError> {
    parse(raw).ok_or_else(|| DomainError::internal(format!("unrecognized {} value '{}'", what, raw)))
}

/// Reads a money column pair by column name.
pub(crate) fn money_from_row(
    row: &sqlx::postgres::PgRow,
    amount_col: &str,
    currency_col: &str,
) -> Result<Money, DomainError> {
    let amount: Decimal = row
        .try_get(amount_col)
        .map_err(db_err("missing money amount column"))?;
    let currency: String = row
        .try_get(currency_col)
        .map_err(db_err("missing money currency column"))?;
    Ok(Money::new(amount, &currency))
}
