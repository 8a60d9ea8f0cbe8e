//! Port for trip packages, trip bookings, and excursions.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::model::{
    Excursion, ExcursionBooking, NewExcursionBooking, NewRefund, NewTripBooking, Refund,
    TripBooking, TripBookingDetail, TripPackage,
};

#[async_trait]
pub trait TripStore: Send + Sync {
    /// All packages, optionally narrowed by destination substring.
    async fn packages(&self, destination: Option<&str>) -> Result<Vec<TripPackage>, DomainError>;

    async fn package_by_code(&self, code: &str) -> Result<Option<TripPackage>, DomainError>;

    async fn trip_reference_exists(&self, reference: &str) -> Result<bool, DomainError>;

    /// Creates the trip booking, atomically.
    async fn book(&self, booking: NewTripBooking) -> Result<TripBooking, DomainError>;

    /// Trip booking with its package and excursions materialized.
    async fn trip_booking_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<TripBookingDetail>, DomainError>;

    /// Flips the trip booking to `cancelled` and records the refund,
    /// atomically.
    async fn cancel_trip_booking(
        &self,
        trip_booking_id: i64,
        refund: NewRefund,
    ) -> Result<Refund, DomainError>;

    async fn excursions(&self, destination: Option<&str>) -> Result<Vec<Excursion>, DomainError>;

    async fn excursion_by_code(&self, code: &str) -> Result<Option<Excursion>, DomainError>;

    async fn book_excursion(
        &self,
        booking: NewExcursionBooking,
    ) -> Result<ExcursionBooking, DomainError>;
}
