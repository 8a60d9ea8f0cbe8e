//! Port for airline/airport/aircraft reference data.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::model::{AircraftType, Airline, Airport};

/// Read-only lookups over the reference tables.
#[async_trait]
pub trait ReferenceDataStore: Send + Sync {
    /// Exact IATA match, case-insensitive.
    async fn airport_by_iata(&self, code: &str) -> Result<Option<Airport>, DomainError>;

    /// Case-insensitive city substring match.
    async fn airports_by_city(&self, city: &str) -> Result<Vec<Airport>, DomainError>;

    /// Exact IATA match, case-insensitive.
    async fn airline_by_iata(&self, code: &str) -> Result<Option<Airline>, DomainError>;

    /// Case-insensitive name substring match.
    async fn airlines_by_name(&self, name: &str) -> Result<Vec<Airline>, DomainError>;

    async fn aircraft_type_by_id(&self, id: i64) -> Result<Option<AircraftType>, DomainError>;
}
