//! Port for passenger identity lookups.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::model::Passenger;

#[async_trait]
pub trait PassengerStore: Send + Sync {
    async fn by_id(&self, id: i64) -> Result<Option<Passenger>, DomainError>;

    /// Exact email match, case-insensitive.
    async fn by_email(&self, email: &str) -> Result<Option<Passenger>, DomainError>;

    /// Case-insensitive substring match on first and last name.
    async fn by_name(&self, first_name: &str, last_name: &str)
        -> Result<Vec<Passenger>, DomainError>;

    /// Joins last name against segments on the given flight number.
    async fn by_last_name_and_flight(
        &self,
        last_name: &str,
        flight_number: &str,
    ) -> Result<Option<Passenger>, DomainError>;

    async fn by_frequent_flyer_number(
        &self,
        number: &str,
    ) -> Result<Option<Passenger>, DomainError>;

    /// Updates contact fields, returning the stored row.
    async fn update_contact(
        &self,
        passenger_id: i64,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Passenger, DomainError>;
}
