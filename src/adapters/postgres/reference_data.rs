//! PostgreSQL implementation of ReferenceDataStore.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::foundation::DomainError;
use crate::domain::model::{AircraftType, Airline, Airport};
use crate::ports::ReferenceDataStore;

use super::db_err;

const AIRPORT_COLUMNS: &str =
    "id, iata_code, icao_code, name, city, country, timezone, latitude, longitude";
const AIRLINE_COLUMNS: &str = "id, iata_code, icao_code, name, country, alliance";

pub(crate) fn row_to_airport(row: &PgRow) -> Result<Airport, DomainError> {
    Ok(Airport {
        id: row.try_get("id").map_err(db_err("airport row"))?,
        iata_code: row.try_get("iata_code").map_err(db_err("airport row"))?,
        icao_code: row.try_get("icao_code").map_err(db_err("airport row"))?,
        name: row.try_get("name").map_err(db_err("airport row"))?,
        city: row.try_get("city").map_err(db_err("airport row"))?,
        country: row.try_get("country").map_err(db_err("airport row"))?,
        timezone: row.try_get("timezone").map_err(db_err("airport row"))?,
        latitude: row
            .try_get::<Decimal, _>("latitude")
            .map_err(db_err("airport row"))?,
        longitude: row
            .try_get::<Decimal, _>("longitude")
            .map_err(db_err("airport row"))?,
    })
}

pub(crate) fn row_to_airline(row: &PgRow) -> Result<Airline, DomainError> {
    Ok(Airline {
        id: row.try_get("id").map_err(db_err("airline row"))?,
        iata_code: row.try_get("iata_code").map_err(db_err("airline row"))?,
        icao_code: row.try_get("icao_code").map_err(db_err("airline row"))?,
        name: row.try_get("name").map_err(db_err("airline row"))?,
        country: row.try_get("country").map_err(db_err("airline row"))?,
        alliance: row.try_get("alliance").map_err(db_err("airline row"))?,
    })
}

fn row_to_aircraft_type(row: &PgRow) -> Result<AircraftType, DomainError> {
    Ok(AircraftType {
        id: row.try_get("id").map_err(db_err("aircraft type row"))?,
        manufacturer: row
            .try_get("manufacturer")
            .map_err(db_err("aircraft type row"))?,
        model: row.try_get("model").map_err(db_err("aircraft type row"))?,
        seats_economy: row
            .try_get("seats_economy")
            .map_err(db_err("aircraft type row"))?,
        seats_premium_economy: row
            .try_get("seats_premium_economy")
            .map_err(db_err("aircraft type row"))?,
        seats_business: row
            .try_get("seats_business")
            .map_err(db_err("aircraft type row"))?,
        seats_first: row
            .try_get("seats_first")
            .map_err(db_err("aircraft type row"))?,
        total_seats: row
            .try_get("total_seats")
            .map_err(db_err("aircraft type row"))?,
        range_km: row.try_get("range_km").map_err(db_err("aircraft type row"))?,
    })
}

/// PostgreSQL implementation of ReferenceDataStore.
#[derive(Clone)]
pub struct PgReferenceDataStore {
    pool: PgPool,
}

impl PgReferenceDataStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferenceDataStore for PgReferenceDataStore {
    async fn airport_by_iata(&self, code: &str) -> Result<Option<Airport>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM airports WHERE UPPER(iata_code) = UPPER($1)",
            AIRPORT_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("failed to fetch airport"))?;
        row.as_ref().map(row_to_airport).transpose()
    }

    async fn airports_by_city(&self, city: &str) -> Result<Vec<Airport>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM airports WHERE city ILIKE '%' || $1 || '%' ORDER BY iata_code",
            AIRPORT_COLUMNS
        ))
        .bind(city)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("failed to search airports by city"))?;
        rows.iter().map(row_to_airport).collect()
    }

    async fn airline_by_iata(&self, code: &str) -> Result<Option<Airline>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM airlines WHERE UPPER(iata_code) = UPPER($1)",
            AIRLINE_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("failed to fetch airline"))?;
        row.as_ref().map(row_to_airline).transpose()
    }

    async fn airlines_by_name(&self, name: &str) -> Result<Vec<Airline>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM airlines WHERE name ILIKE '%' || $1 || '%' ORDER BY name",
            AIRLINE_COLUMNS
        ))
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("failed to search airlines by name"))?;
        rows.iter().map(row_to_airline).collect()
    }

    async fn aircraft_type_by_id(&self, id: i64) -> Result<Option<AircraftType>, DomainError> {
        let row = sqlx::query(
            "SELECT id, manufacturer, model, seats_economy, seats_premium_economy, \
             seats_business, seats_first, total_seats, range_km \
             FROM aircraft_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("failed to fetch aircraft type"))?;
        row.as_ref().map(row_to_aircraft_type).transpose()
    }
}
