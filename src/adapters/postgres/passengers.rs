//! PostgreSQL implementation of PassengerStore.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::foundation::DomainError;
use crate::domain::model::{Passenger, PassengerTier};
use crate::ports::PassengerStore;

use super::{db_err, parse_enum};

const PASSENGER_COLUMNS: &str = "id, first_name, last_name, email, phone, date_of_birth, \
     nationality, passport_number, frequent_flyer_number, tier";

pub(crate) fn row_to_passenger(row: &PgRow) -> Result<Passenger, DomainError> {
    let tier: String = row.try_get("tier").map_err(db_err("passenger row"))?;
    Ok(Passenger {
        id: row.try_get("id").map_err(db_err("passenger row"))?,
        first_name: row.try_get("first_name").map_err(db_err("passenger row"))?,
        last_name: row.try_get("last_name").map_err(db_err("passenger row"))?,
        email: row.try_get("email").map_err(db_err("passenger row"))?,
        phone: row.try_get("phone").map_err(db_err("passenger row"))?,
        date_of_birth: row.try_get("date_of_birth").map_err(db_err("passenger row"))?,
        nationality: row.try_get("nationality").map_err(db_err("passenger row"))?,
        passport_number: row
            .try_get("passport_number")
            .map_err(db_err("passenger row"))?,
        frequent_flyer_number: row
            .try_get("frequent_flyer_number")
            .map_err(db_err("passenger row"))?,
        tier: parse_enum(&tier, PassengerTier::from_str, "passenger tier")?,
    })
}

/// PostgreSQL implementation of PassengerStore.
#[derive(Clone)]
pub struct PgPassengerStore {
    pool: PgPool,
}

impl PgPassengerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PassengerStore for PgPassengerStore {
    async fn by_id(&self, id: i64) -> Result<Option<Passenger>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM passengers WHERE id = $1",
            PASSENGER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("failed to fetch passenger"))?;
        row.as_ref().map(row_to_passenger).transpose()
    }

    async fn by_email(&self, email: &str) -> Result<Option<Passenger>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM passengers WHERE LOWER(email) = LOWER($1)",
            PASSENGER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("failed to fetch passenger by email"))?;
        row.as_ref().map(row_to_passenger).transpose()
    }

    async fn by_name(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<Vec<Passenger>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM passengers \
             WHERE first_name ILIKE '%' || $1 || '%' AND last_name ILIKE '%' || $2 || '%' \
             ORDER BY last_name, first_name",
            PASSENGER_COLUMNS
        ))
        .bind(first_name)
        .bind(last_name)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("failed to search passengers by name"))?;
        rows.iter().map(row_to_passenger).collect()
    }

    async fn by_last_name_and_flight(
        &self,
        last_name: &str,
        flight_number: &str,
    ) -> Result<Option<Passenger>, DomainError> {
        let row = sqlx::query(
            "SELECT DISTINCT p.id, p.first_name, p.last_name, p.email, p.phone, \
             p.date_of_birth, p.nationality, p.passport_number, p.frequent_flyer_number, p.tier \
             FROM passengers p \
             JOIN booking_segments bs ON bs.passenger_id = p.id \
             JOIN flights f ON f.id = bs.flight_id \
             WHERE p.last_name ILIKE $1 AND UPPER(f.flight_number) = UPPER($2) \
             LIMIT 1",
        )
        .bind(last_name)
        .bind(flight_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("failed to fetch passenger by last name and flight"))?;
        row.as_ref().map(row_to_passenger).transpose()
    }

    async fn by_frequent_flyer_number(
        &self,
        number: &str,
    ) -> Result<Option<Passenger>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM passengers WHERE UPPER(frequent_flyer_number) = UPPER($1)",
            PASSENGER_COLUMNS
        ))
        .bind(number)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("failed to fetch passenger by frequent flyer number"))?;
        row.as_ref().map(row_to_passenger).transpose()
    }

    async fn update_contact(
        &self,
        passenger_id: i64,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Passenger, DomainError> {
        let row = sqlx::query(&format!(
            "UPDATE passengers SET email = COALESCE($2, email), phone = COALESCE($3, phone) \
             WHERE id = $1 RETURNING {}",
            PASSENGER_COLUMNS
        ))
        .bind(passenger_id)
        .bind(email)
        .bind(phone)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("failed to update passenger contact"))?;
        row_to_passenger(&row)
    }
}
