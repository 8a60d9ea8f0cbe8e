//! Seat map and seat change operations.

use serde_json::{json, Value};

use crate::application::{reconcile, Services};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::model::{FlightSeat, SeatMapRow, SeatStatus};
use crate::domain::rules::seating;

use super::{load_booking, refuse_terminal, target_segment};

const SEAT_KEYS: &[&str] = &["seat_number", "seat", "new_seat"];

fn occupancy_for<'a>(seats: &'a [FlightSeat], seat_number: &str) -> Option<&'a FlightSeat> {
    seats.iter().find(|s| s.seat_number == seat_number)
}

/// `change_seat` - moves the ticketed passenger onto the requested seat,
/// charging the seat fee. The old seat frees atomically with the claim.
pub async fn change_seat(services: Services, params: Value) -> Result<Value, DomainError> {
    let detail = load_booking(&services, &params).await?;
    refuse_terminal(&detail, "reseated")?;

    let segment = target_segment(&detail, &params)?;
    let requested = reconcile::require_str(&params, SEAT_KEYS)?.to_uppercase();

    let layout = services
        .flights
        .seat_map(segment.flight.aircraft_type_id)
        .await?;
    let seat = layout
        .iter()
        .find(|s| s.seat_number == requested)
        .ok_or_else(|| {
            DomainError::new(
                ErrorCode::SeatUnavailable,
                format!(
                    "Seat {} does not exist on flight {}",
                    requested, segment.flight.flight.flight_number
                ),
            )
        })?;

    let occupancy = services.flights.flight_seats(segment.flight.flight.id).await?;
    seating::validate_seat_target(
        seat,
        occupancy_for(&occupancy, &requested),
        segment.segment.cabin_class,
        segment.segment.id,
    )?;

    let fee = seating::seat_change_fee(seat, "USD");
    let old_seat = segment.segment.seat_number.clone();
    services
        .flights
        .reseat(
            segment.flight.flight.id,
            segment.segment.id,
            detail.passenger.id,
            old_seat.as_deref(),
            &requested,
            fee.clone(),
        )
        .await?;

    Ok(json!({
        "booking_reference": detail.booking.reference,
        "flight_number": segment.flight.flight.flight_number,
        "old_seat": old_seat,
        "new_seat": requested,
        "fee": fee,
        "seat": {
            "type": seat.seat_type,
            "class": seat.cabin_class,
            "exit_row": seat.exit_row,
            "extra_legroom": seat.extra_legroom,
        },
    }))
}

fn seat_json(seat: &SeatMapRow, occupancy: Option<&FlightSeat>) -> Value {
    let status = if seat.blocked {
        "blocked"
    } else {
        match occupancy.map(|o| o.status) {
            Some(SeatStatus::Occupied) => "occupied",
            Some(SeatStatus::Blocked) => "blocked",
            _ => "available",
        }
    };
    json!({
        "seat_number": seat.seat_number,
        "type": seat.seat_type,
        "class": seat.cabin_class,
        "exit_row": seat.exit_row,
        "extra_legroom": seat.extra_legroom,
        "status": status,
    })
}

/// `get_seat_map` - the full cabin layout with live occupancy, optionally
/// narrowed to one class.
pub async fn get_seat_map(services: Services, params: Value) -> Result<Value, DomainError> {
    let number = reconcile::require_str(&params, &["flight_number", "flight"])?.to_uppercase();
    let flight = match reconcile::opt_date(&params, &["departure_date", "date", "travel_date"])? {
        Some(date) => services.flights.by_number_and_date(&number, date).await?,
        None => services.flights.next_by_number(&number).await?,
    }
    .ok_or_else(|| {
        DomainError::new(ErrorCode::FlightNotFound, format!("No flight found for {}", number))
    })?;

    let wanted = reconcile::cabin_class(&params)?;
    let layout = services.flights.seat_map(flight.aircraft_type_id).await?;
    let occupancy = services.flights.flight_seats(flight.flight.id).await?;

    let mut available = 0usize;
    let seats: Vec<Value> = layout
        .iter()
        .filter(|s| wanted.map_or(true, |c| s.cabin_class == c))
        .map(|s| {
            let row = occupancy_for(&occupancy, &s.seat_number);
            let rendered = seat_json(s, row);
            if rendered["status"] == "available" {
                available += 1;
            }
            rendered
        })
        .collect();

    Ok(json!({
        "flight_number": flight.flight.flight_number,
        "departure_date": flight.flight.scheduled_departure.date_naive(),
        "total_seats": seats.len(),
        "available_seats": available,
        "seats": seats,
    }))
}
