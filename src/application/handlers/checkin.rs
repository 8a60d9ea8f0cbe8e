//! Check-in and boarding-pass operations.
//!
//! Check-in is per segment: one call reports an outcome for every eligible
//! segment rather than failing the whole booking because one leg is outside
//! its window.

use chrono::{Duration, Utc};
use serde_json::{json, Value};

use crate::application::{reconcile, Services};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::model::{BookingDetail, CheckInStatus, SeatType, SegmentDetail};
use crate::domain::rules::checkin::{check_in_window, WindowPosition};

use super::{load_booking, refuse_terminal};

const BOARDING_LEAD_MINUTES: i64 = 40;

fn boarding_pass_json(detail: &BookingDetail, segment: &SegmentDetail) -> Value {
    let flight = &segment.flight;
    let boarding_time = flight.flight.scheduled_departure - Duration::minutes(BOARDING_LEAD_MINUTES);
    json!({
        "passenger_name": detail.passenger.full_name(),
        "booking_reference": detail.booking.reference,
        "flight_number": flight.flight.flight_number,
        "origin": flight.origin.iata_code,
        "destination": flight.destination.iata_code,
        "scheduled_departure": flight.flight.scheduled_departure,
        "boarding_time": boarding_time,
        "gate": flight.flight.gate,
        "terminal": flight.flight.terminal,
        "seat_number": segment.segment.seat_number,
        "class": segment.segment.cabin_class,
        "ticket_number": segment.segment.ticket_number,
    })
}

/// Segments named by an optional flight number filter, or all of them.
fn selected_segments<'a>(
    detail: &'a BookingDetail,
    params: &Value,
) -> Result<Vec<&'a SegmentDetail>, DomainError> {
    match reconcile::opt_str(params, &["flight_number", "flight"]) {
        Some(number) => {
            let segment = detail.segment_by_flight_number(number).ok_or_else(|| {
                DomainError::new(
                    ErrorCode::FlightNotFound,
                    format!(
                        "Booking {} has no segment on flight {}",
                        detail.booking.reference, number
                    ),
                )
            })?;
            Ok(vec![segment])
        }
        None => Ok(detail.segments.iter().collect()),
    }
}

/// Picks a free seat in the segment's class, preferring aisles. Read-only;
/// the claim happens inside the check-in unit of work.
async fn pick_open_seat(
    services: &Services,
    segment: &SegmentDetail,
) -> Result<Option<String>, DomainError> {
    let open = services
        .flights
        .available_seats(segment.flight.flight.id, segment.segment.cabin_class)
        .await?;
    Ok(open
        .iter()
        .find(|s| s.seat_type == SeatType::Aisle)
        .or_else(|| open.first())
        .map(|s| s.seat_number.clone()))
}

/// `check_in_passenger` - checks in every selected segment whose window is
/// open, assigning a seat where none is held and issuing the boarding pass.
pub async fn check_in_passenger(services: Services, params: Value) -> Result<Value, DomainError> {
    let detail = load_booking(&services, &params).await?;
    refuse_terminal(&detail, "checked in")?;

    let now = Utc::now();
    let mut results = Vec::new();
    for segment in selected_segments(&detail, &params)? {
        let flight = &segment.flight;
        let flight_number = flight.flight.flight_number.clone();

        if segment.segment.check_in_status != CheckInStatus::NotCheckedIn {
            results.push(json!({
                "flight_number": flight_number,
                "outcome": "already_checked_in",
                "seat_number": segment.segment.seat_number,
            }));
            continue;
        }

        let window = check_in_window(flight.flight.scheduled_departure, flight.route.distance_km);
        match window.position(now) {
            WindowPosition::BeforeOpen => {
                results.push(json!({
                    "flight_number": flight_number,
                    "outcome": "too_early",
                    "opens_at": window.opens_at,
                    "closes_at": window.closes_at,
                }));
            }
            WindowPosition::Closed => {
                results.push(json!({
                    "flight_number": flight_number,
                    "outcome": "too_late",
                    "closed_at": window.closes_at,
                }));
            }
            WindowPosition::Open => {
                let (claim, seat) = match &segment.segment.seat_number {
                    Some(existing) => (None, Some(existing.clone())),
                    None => {
                        let picked = pick_open_seat(&services, segment).await?;
                        (picked.clone(), picked)
                    }
                };
                services
                    .bookings
                    .check_in_segment(
                        flight.flight.id,
                        segment.segment.id,
                        detail.passenger.id,
                        claim.as_deref(),
                    )
                    .await?;
                let boarding_time = flight.flight.scheduled_departure
                    - Duration::minutes(BOARDING_LEAD_MINUTES);
                results.push(json!({
                    "flight_number": flight_number,
                    "outcome": "checked_in",
                    "seat_number": seat,
                    "boarding_time": boarding_time,
                    "gate": flight.flight.gate,
                    "terminal": flight.flight.terminal,
                }));
            }
        }
    }

    Ok(json!({
        "booking_reference": detail.booking.reference,
        "passenger_name": detail.passenger.full_name(),
        "results": results,
    }))
}

/// `get_boarding_pass` - the pass for a checked-in segment. A segment not
/// yet checked in is `CheckInUnavailable`, not an empty pass.
pub async fn get_boarding_pass(services: Services, params: Value) -> Result<Value, DomainError> {
    let detail = load_booking(&services, &params).await?;

    let mut passes = Vec::new();
    for segment in selected_segments(&detail, &params)? {
        if segment.segment.check_in_status == CheckInStatus::NotCheckedIn {
            return Err(DomainError::new(
                ErrorCode::CheckInUnavailable,
                format!(
                    "Flight {} is not checked in yet; check in first to get a boarding pass",
                    segment.flight.flight.flight_number
                ),
            ));
        }
        if !segment.segment.boarding_pass_issued {
            services
                .bookings
                .set_boarding_pass_issued(segment.segment.id)
                .await?;
        }
        passes.push(boarding_pass_json(&detail, segment));
    }

    Ok(json!({
        "booking_reference": detail.booking.reference,
        "boarding_passes": passes,
    }))
}

/// `resend_boarding_pass` - re-delivers an already issued pass to the
/// contact email on file.
pub async fn resend_boarding_pass(services: Services, params: Value) -> Result<Value, DomainError> {
    let detail = load_booking(&services, &params).await?;

    let mut passes = Vec::new();
    for segment in selected_segments(&detail, &params)? {
        if segment.segment.check_in_status == CheckInStatus::NotCheckedIn {
            return Err(DomainError::new(
                ErrorCode::CheckInUnavailable,
                format!(
                    "Flight {} is not checked in; there is no boarding pass to resend",
                    segment.flight.flight.flight_number
                ),
            ));
        }
        passes.push(boarding_pass_json(&detail, segment));
    }

    Ok(json!({
        "booking_reference": detail.booking.reference,
        "sent_to": detail.passenger.email,
        "boarding_passes": passes,
    }))
}

/// `get_check_in_info` - windows and current eligibility per segment,
/// read-only.
pub async fn get_check_in_info(services: Services, params: Value) -> Result<Value, DomainError> {
    let detail = load_booking(&services, &params).await?;

    let now = Utc::now();
    let segments: Vec<Value> = selected_segments(&detail, &params)?
        .into_iter()
        .map(|segment| {
            let flight = &segment.flight;
            let window =
                check_in_window(flight.flight.scheduled_departure, flight.route.distance_km);
            let position = match window.position(now) {
                WindowPosition::BeforeOpen => "not_yet_open",
                WindowPosition::Open => "open",
                WindowPosition::Closed => "closed",
            };
            json!({
                "flight_number": flight.flight.flight_number,
                "scheduled_departure": flight.flight.scheduled_departure,
                "check_in_status": segment.segment.check_in_status,
                "window": window,
                "window_state": position,
                "distance_km": flight.route.distance_km,
            })
        })
        .collect();

    Ok(json!({
        "booking_reference": detail.booking.reference,
        "segments": segments,
    }))
}
