//! Port for flights, status history, and seat inventory.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::foundation::{DomainError, Money};
use crate::domain::model::{
    CabinClass, FlightDetail, FlightSeat, FlightStatusUpdate, SeatMapRow,
};

/// Flight reads come back as [`FlightDetail`], with airline, route, and
/// endpoint airports materialized; there is no lazy traversal.
#[async_trait]
pub trait FlightStore: Send + Sync {
    /// Flights between two airports departing on the given date.
    async fn search(
        &self,
        origin_airport_id: i64,
        destination_airport_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<FlightDetail>, DomainError>;

    /// A flight by number and departure date.
    async fn by_number_and_date(
        &self,
        flight_number: &str,
        date: NaiveDate,
    ) -> Result<Option<FlightDetail>, DomainError>;

    /// The next upcoming flight with this number, by scheduled departure.
    async fn next_by_number(&self, flight_number: &str) -> Result<Option<FlightDetail>, DomainError>;

    async fn by_id(&self, id: i64) -> Result<Option<FlightDetail>, DomainError>;

    /// Latest status row by update time; append-only history.
    async fn latest_status_update(
        &self,
        flight_id: i64,
    ) -> Result<Option<FlightStatusUpdate>, DomainError>;

    /// Cabin layout for the flight's aircraft type.
    async fn seat_map(&self, aircraft_type_id: i64) -> Result<Vec<SeatMapRow>, DomainError>;

    /// All materialized seat rows for a flight (rows appear on first
    /// assignment).
    async fn flight_seats(&self, flight_id: i64) -> Result<Vec<FlightSeat>, DomainError>;

    /// Seats in the given class with no occupying row, in seat-number order.
    async fn available_seats(
        &self,
        flight_id: i64,
        cabin_class: CabinClass,
    ) -> Result<Vec<SeatMapRow>, DomainError>;

    /// Moves a segment's passenger onto `new_seat`, freeing `old_seat` when
    /// present. Occupancy is re-checked inside the transaction; a
    /// concurrently taken seat surfaces as `SeatUnavailable`.
    async fn reseat(
        &self,
        flight_id: i64,
        segment_id: i64,
        passenger_id: i64,
        old_seat: Option<&str>,
        new_seat: &str,
        fee: Money,
    ) -> Result<(), DomainError>;
}
