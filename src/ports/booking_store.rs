//! Port for bookings, segments, baggage, and check-in state.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Money};
use crate::domain::model::{
    Baggage, BookingDetail, BookingStatus, NewBaggage, NewBooking, NewRefund, NewSegment, Refund,
};

/// Booking reads come back as [`BookingDetail`] with passenger and segments
/// (and each segment's flight) materialized. Every mutating method is one
/// unit of work: it commits atomically or rolls back.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn by_reference(&self, reference: &str) -> Result<Option<BookingDetail>, DomainError>;

    /// Collision probe for the reference generator.
    async fn reference_exists(&self, reference: &str) -> Result<bool, DomainError>;

    /// Creates the booking and all its segments, atomically.
    async fn create(&self, booking: NewBooking) -> Result<BookingDetail, DomainError>;

    /// Flips the booking to `cancelled` and records the refund, atomically.
    /// Also frees any seats held by the booking's segments.
    async fn cancel(&self, booking_id: i64, refund: NewRefund) -> Result<Refund, DomainError>;

    async fn set_status(&self, booking_id: i64, status: BookingStatus) -> Result<(), DomainError>;

    /// Replaces the segment set and adjusts the total (confirmed flight
    /// change), atomically.
    async fn replace_segments(
        &self,
        booking_id: i64,
        segments: Vec<NewSegment>,
        new_total: Money,
    ) -> Result<BookingDetail, DomainError>;

    /// Checks a segment in as one unit of work: claims the chosen seat when
    /// one is supplied, flips the check-in status, and issues the boarding
    /// pass. A seat held by another segment fails the whole call with no
    /// state change.
    async fn check_in_segment(
        &self,
        flight_id: i64,
        segment_id: i64,
        passenger_id: i64,
        claim_seat: Option<&str>,
    ) -> Result<(), DomainError>;

    async fn set_boarding_pass_issued(&self, segment_id: i64) -> Result<(), DomainError>;

    async fn add_baggage(&self, baggage: NewBaggage) -> Result<Baggage, DomainError>;

    async fn baggage_for_booking(&self, booking_id: i64) -> Result<Vec<Baggage>, DomainError>;

    async fn baggage_by_tag(&self, tag_number: &str) -> Result<Option<Baggage>, DomainError>;
}
