//! Operation handlers, grouped by intent family.
//!
//! Every handler follows the same shape: reconcile the parameter bag, read
//! pre-joined entities, validate with the rule library, mutate atomically
//! through a store method, and return a domain JSON value. Envelopes are the
//! dispatcher's job.

pub mod baggage;
pub mod bookings;
pub mod checkin;
pub mod flights;
pub mod insurance;
pub mod policies;
pub mod refunds;
pub mod seats;
pub mod service;
pub mod trips;

use serde_json::{json, Value};

use crate::domain::foundation::refs::generate_booking_reference;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::model::{BookingDetail, BookingStatus, FlightDetail, SegmentDetail};
use crate::ports::BookingStore;

use super::{reconcile, Services};

/// Refuses operations on bookings already in a terminal state, naming the
/// state precisely.
pub(crate) fn refuse_terminal(detail: &BookingDetail, action: &str) -> Result<(), DomainError> {
    match detail.booking.status {
        BookingStatus::Cancelled => Err(DomainError::new(
            ErrorCode::AlreadyCancelled,
            format!(
                "Booking {} is already cancelled and cannot be {}",
                detail.booking.reference, action
            ),
        )),
        BookingStatus::Refunded => Err(DomainError::new(
            ErrorCode::AlreadyRefunded,
            format!(
                "Booking {} has been refunded and cannot be {}",
                detail.booking.reference, action
            ),
        )),
        _ => Ok(()),
    }
}

/// Loads the booking named by the bag's reference aliases, or fails with
/// `BookingNotFound`.
pub(crate) async fn load_booking(
    services: &Services,
    params: &Value,
) -> Result<BookingDetail, DomainError> {
    let reference = reconcile::booking_reference(params)?;
    services
        .bookings
        .by_reference(&reference)
        .await?
        .ok_or_else(|| {
            DomainError::new(
                ErrorCode::BookingNotFound,
                format!("No booking found for reference {}", reference),
            )
        })
}

/// Generates a booking reference that is free in the store, regenerating on
/// collision.
pub(crate) async fn unique_booking_reference(
    store: &dyn BookingStore,
) -> Result<String, DomainError> {
    loop {
        let candidate = {
            let mut rng = rand::thread_rng();
            generate_booking_reference(&mut rng)
        };
        if !store.reference_exists(&candidate).await? {
            return Ok(candidate);
        }
    }
}

/// The segment an operation targets: the one on the named flight, or the
/// next to depart when no flight number is supplied.
pub(crate) fn target_segment<'a>(
    detail: &'a BookingDetail,
    params: &Value,
) -> Result<&'a SegmentDetail, DomainError> {
    if let Some(number) = reconcile::opt_str(params, &["flight_number", "flight"]) {
        return detail.segment_by_flight_number(number).ok_or_else(|| {
            DomainError::new(
                ErrorCode::FlightNotFound,
                format!(
                    "Booking {} has no segment on flight {}",
                    detail.booking.reference, number
                ),
            )
        });
    }
    detail
        .segments
        .iter()
        .min_by_key(|s| s.flight.flight.scheduled_departure)
        .ok_or_else(|| {
            DomainError::internal(format!("booking {} has no segments", detail.booking.reference))
        })
}

/// The flight shape shared by flight-facing operations.
pub(crate) fn flight_json(detail: &FlightDetail) -> Value {
    json!({
        "flight_number": detail.flight.flight_number,
        "airline": {
            "iata_code": detail.airline.iata_code,
            "name": detail.airline.name,
        },
        "origin": {
            "iata_code": detail.origin.iata_code,
            "city": detail.origin.city,
            "country": detail.origin.country,
        },
        "destination": {
            "iata_code": detail.destination.iata_code,
            "city": detail.destination.city,
            "country": detail.destination.country,
        },
        "scheduled_departure": detail.flight.scheduled_departure,
        "scheduled_arrival": detail.flight.scheduled_arrival,
        "status": detail.flight.status,
        "gate": detail.flight.gate,
        "terminal": detail.flight.terminal,
        "distance_km": detail.route.distance_km,
        "duration_minutes": detail.route.duration_minutes,
        "route_type": detail.route_type(),
    })
}

/// The segment shape shared by booking-facing operations.
pub(crate) fn segment_json(segment: &SegmentDetail) -> Value {
    json!({
        "segment_id": segment.segment.id,
        "flight_number": segment.flight.flight.flight_number,
        "origin": segment.flight.origin.iata_code,
        "destination": segment.flight.destination.iata_code,
        "scheduled_departure": segment.flight.flight.scheduled_departure,
        "scheduled_arrival": segment.flight.flight.scheduled_arrival,
        "class": segment.segment.cabin_class,
        "ticket_number": segment.segment.ticket_number,
        "seat_number": segment.segment.seat_number,
        "baggage_allowance_kg": segment.segment.baggage_allowance_kg,
        "meal_preference": segment.segment.meal_preference,
        "check_in_status": segment.segment.check_in_status,
        "boarding_pass_issued": segment.segment.boarding_pass_issued,
    })
}
