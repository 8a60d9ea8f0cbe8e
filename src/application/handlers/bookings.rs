//! Booking lifecycle operations: purchase, inspect, cancel, change.

use chrono::Utc;
use serde_json::{json, Value};

use crate::application::{reconcile, Services};
use crate::domain::foundation::refs::{generate_refund_reference, generate_ticket_number};
use crate::domain::foundation::{DomainError, ErrorCode, Money};
use crate::domain::model::{
    BookingDetail, BookingStatus, CabinClass, FlightDetail, NewBooking, NewRefund, NewSegment,
    RefundMethod, TripType,
};
use crate::domain::rules::{baggage, fees, pricing, refund};
use rust_decimal::prelude::ToPrimitive;

use super::{
    flight_json, load_booking, refuse_terminal, segment_json, target_segment,
    unique_booking_reference,
};

const ORIGIN_KEYS: &[&str] = &["origin", "origin_airport", "from", "departure_city"];
const DESTINATION_KEYS: &[&str] = &["destination", "destination_airport", "to", "arrival_city"];
const DATE_KEYS: &[&str] = &["departure_date", "date", "travel_date"];

fn booking_json(detail: &BookingDetail) -> Value {
    json!({
        "reference": detail.booking.reference,
        "status": detail.booking.status,
        "booking_date": detail.booking.booking_date,
        "total": detail.booking.total,
        "trip_type": detail.booking.trip_type,
        "source": detail.booking.source,
        "passenger": {
            "first_name": detail.passenger.first_name,
            "last_name": detail.passenger.last_name,
            "email": detail.passenger.email,
            "tier": detail.passenger.tier,
        },
        "segments": detail.segments.iter().map(segment_json).collect::<Vec<_>>(),
    })
}

async fn pick_flight(
    services: &Services,
    params: &Value,
) -> Result<FlightDetail, DomainError> {
    if let Some(number) = reconcile::opt_str(params, &["flight_number", "flight"]) {
        let date = reconcile::date(params, DATE_KEYS)?;
        return services
            .flights
            .by_number_and_date(&number.to_uppercase(), date)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::FlightNotFound,
                    format!("No flight {} on {}", number.to_uppercase(), date),
                )
            });
    }

    let origin_raw = reconcile::require_str(params, ORIGIN_KEYS)?;
    let destination_raw = reconcile::require_str(params, DESTINATION_KEYS)?;
    let date = reconcile::date(params, DATE_KEYS)?;

    let origin = reconcile::resolve_airport(services.reference_data.as_ref(), origin_raw)
        .await?
        .ok_or_else(|| {
            DomainError::new(
                ErrorCode::FlightNotFound,
                format!("Unknown origin airport '{}'", origin_raw),
            )
        })?;
    let destination =
        reconcile::resolve_airport(services.reference_data.as_ref(), destination_raw)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::FlightNotFound,
                    format!("Unknown destination airport '{}'", destination_raw),
                )
            })?;

    let mut found = services.flights.search(origin.id, destination.id, date).await?;
    found.sort_by_key(|f| f.flight.scheduled_departure);
    found.into_iter().next().ok_or_else(|| {
        DomainError::new(
            ErrorCode::FlightNotFound,
            format!(
                "No flights from {} to {} on {}",
                origin.iata_code, destination.iata_code, date
            ),
        )
    })
}

fn new_segment_for(flight: &FlightDetail, class: CabinClass) -> NewSegment {
    let allowance = baggage::baggage_allowance(class, flight.route_type(), None, "USD");
    let ticket_number = {
        let mut rng = rand::thread_rng();
        generate_ticket_number(&mut rng)
    };
    NewSegment {
        flight_id: flight.flight.id,
        cabin_class: class,
        fare_basis: None,
        ticket_number,
        seat_number: None,
        baggage_allowance_kg: allowance
            .checked_weight_kg_per_piece
            .to_i32()
            .unwrap_or(23)
            .max(1),
        meal_preference: None,
    }
}

/// `book_flight` - creates a booking with one segment (or two for a round
/// trip), priced deterministically, atomically or not at all.
pub async fn book_flight(services: Services, params: Value) -> Result<Value, DomainError> {
    let passenger = reconcile::resolve_passenger(&services, &params).await?;
    let class = reconcile::cabin_class(&params)?.unwrap_or(CabinClass::Economy);
    let party = reconcile::party_size(&params)?;

    let outbound = pick_flight(&services, &params).await?;
    let outbound_date = outbound.flight.scheduled_departure.date_naive();

    let mut flights = vec![outbound];
    if let Some(return_date) = reconcile::opt_date(&params, &["return_date"])? {
        let origin_id = flights[0].route.destination_airport_id;
        let destination_id = flights[0].route.origin_airport_id;
        let mut candidates = services.flights.search(origin_id, destination_id, return_date).await?;
        candidates.sort_by_key(|f| f.flight.scheduled_departure);
        let inbound = candidates.into_iter().next().ok_or_else(|| {
            DomainError::new(
                ErrorCode::FlightNotFound,
                format!("No return flights on {}", return_date),
            )
        })?;
        flights.push(inbound);
    }

    let today = Utc::now().date_naive();
    let mut total = Money::zero("USD");
    for flight in &flights {
        let quote = pricing::price_quote(
            class,
            flight.flight.scheduled_departure.date_naive(),
            today,
            "USD",
        );
        total = total.add(&quote.total.scale(party.billing_weight()))?;
    }

    let trip_type = if flights.len() > 1 {
        TripType::RoundTrip
    } else {
        TripType::OneWay
    };
    let reference = unique_booking_reference(services.bookings.as_ref()).await?;
    let segments = flights.iter().map(|f| new_segment_for(f, class)).collect();

    let created = services
        .bookings
        .create(NewBooking {
            reference,
            passenger_id: passenger.id,
            total,
            source: reconcile::opt_str(&params, &["source"]).map(str::to_string),
            trip_type,
            segments,
        })
        .await?;

    Ok(json!({
        "booking_reference": created.booking.reference,
        "status": created.booking.status,
        "total": created.booking.total,
        "departure_date": outbound_date,
        "passengers": party.total(),
        "booking": booking_json(&created),
    }))
}

/// `get_booking_details` - the booking read model, verbatim.
pub async fn get_booking_details(services: Services, params: Value) -> Result<Value, DomainError> {
    let detail = load_booking(&services, &params).await?;
    Ok(booking_json(&detail))
}

/// `cancel_booking` - applies the fee tiers, records the refund, and flips
/// the booking to `cancelled`, all in one unit of work. Re-cancelling is
/// `AlreadyCancelled`; a departed or imminent flight is `PolicyViolation`.
pub async fn cancel_booking(services: Services, params: Value) -> Result<Value, DomainError> {
    let detail = load_booking(&services, &params).await?;
    refuse_terminal(&detail, "cancelled again")?;

    let departure = detail.earliest_departure().ok_or_else(|| {
        DomainError::internal(format!("booking {} has no segments", detail.booking.reference))
    })?;
    let time_to_departure = departure - Utc::now();

    let fee = fees::cancellation_fee(&detail.booking.total, time_to_departure)?;
    let (amount, refund_type) = refund::refund_amount(&detail.booking.total, &fee)?;

    let method = match reconcile::opt_str(&params, &["refund_method", "method"]) {
        Some(raw) => RefundMethod::from_str(raw).ok_or_else(|| {
            DomainError::invalid_parameter("refund_method", format!("Unknown refund method '{}'", raw))
        })?,
        None => RefundMethod::CreditCard,
    };

    let reference = {
        let mut rng = rand::thread_rng();
        generate_refund_reference(&mut rng)
    };
    let created = services
        .bookings
        .cancel(
            detail.booking.id,
            NewRefund {
                reference,
                refund_type,
                amount: amount.clone(),
                reason: reconcile::opt_str(&params, &["reason"])
                    .unwrap_or("Customer requested cancellation")
                    .to_string(),
                method,
            },
        )
        .await?;

    Ok(json!({
        "booking_reference": detail.booking.reference,
        "status": BookingStatus::Cancelled,
        "cancellation_fee": fee,
        "refund_amount": amount,
        "refund": {
            "reference": created.reference,
            "type": created.refund_type,
            "status": created.status,
            "method": created.method,
            "processing_time": refund::processing_time(created.method),
        },
    }))
}

/// `change_flight` - quotes up to three alternatives and the change fee.
/// Read-only; `confirm_flight_change` performs the swap.
pub async fn change_flight(services: Services, params: Value) -> Result<Value, DomainError> {
    let detail = load_booking(&services, &params).await?;
    refuse_terminal(&detail, "changed")?;

    let segment = target_segment(&detail, &params)?;
    let new_date = reconcile::opt_date(&params, &["new_date", "new_departure_date"])?;
    let new_destination_raw = reconcile::opt_str(&params, &["new_destination", "new_arrival_city"]);
    if new_date.is_none() && new_destination_raw.is_none() {
        return Err(DomainError::invalid_parameter(
            "new_date",
            "Provide a new_date or a new_destination to search alternatives",
        ));
    }

    let destination = match new_destination_raw {
        Some(raw) => reconcile::resolve_airport(services.reference_data.as_ref(), raw)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::FlightNotFound,
                    format!("Unknown destination '{}'", raw),
                )
            })?,
        None => segment.flight.destination.clone(),
    };
    let date = new_date.unwrap_or_else(|| segment.flight.flight.scheduled_departure.date_naive());

    let mut alternatives = services
        .flights
        .search(segment.flight.origin.id, destination.id, date)
        .await?;
    alternatives.sort_by_key(|f| f.flight.scheduled_departure);
    alternatives.truncate(3);

    let time_to_departure = segment.flight.flight.scheduled_departure - Utc::now();
    let fee = fees::change_fee(time_to_departure, segment.flight.route.distance_km, "USD")?;

    Ok(json!({
        "booking_reference": detail.booking.reference,
        "current_flight": flight_json(&segment.flight),
        "alternatives": alternatives.iter().map(flight_json).collect::<Vec<_>>(),
        "change_fee": fee,
        "message": "Call confirm_flight_change with the chosen flight to complete the change",
    }))
}

/// `confirm_flight_change` - swaps the target segment onto the chosen
/// flight, adds the change fee to the total, atomically.
pub async fn confirm_flight_change(services: Services, params: Value) -> Result<Value, DomainError> {
    let detail = load_booking(&services, &params).await?;
    refuse_terminal(&detail, "changed")?;

    let segment = target_segment(&detail, &params)?;
    let new_number = reconcile::require_str(&params, &["new_flight_number", "new_flight"])?
        .to_uppercase();
    let new_date = reconcile::date(&params, &["new_date", "new_departure_date"])?;

    let new_flight = services
        .flights
        .by_number_and_date(&new_number, new_date)
        .await?
        .ok_or_else(|| {
            DomainError::new(
                ErrorCode::FlightNotFound,
                format!("No flight {} on {}", new_number, new_date),
            )
        })?;

    let time_to_departure = segment.flight.flight.scheduled_departure - Utc::now();
    let fee = fees::change_fee(time_to_departure, segment.flight.route.distance_km, "USD")?;
    let new_total = detail.booking.total.add(&fee)?;

    let changed_segment_id = segment.segment.id;
    let class = segment.segment.cabin_class;
    let new_segments: Vec<NewSegment> = detail
        .segments
        .iter()
        .map(|s| {
            if s.segment.id == changed_segment_id {
                new_segment_for(&new_flight, class)
            } else {
                NewSegment {
                    flight_id: s.segment.flight_id,
                    cabin_class: s.segment.cabin_class,
                    fare_basis: s.segment.fare_basis.clone(),
                    ticket_number: s.segment.ticket_number.clone(),
                    seat_number: s.segment.seat_number.clone(),
                    baggage_allowance_kg: s.segment.baggage_allowance_kg,
                    meal_preference: s.segment.meal_preference.clone(),
                }
            }
        })
        .collect();

    let updated = services
        .bookings
        .replace_segments(detail.booking.id, new_segments, new_total)
        .await?;

    Ok(json!({
        "booking_reference": updated.booking.reference,
        "status": updated.booking.status,
        "change_fee": fee,
        "new_total": updated.booking.total,
        "booking": booking_json(&updated),
    }))
}

/// `update_passenger_details` - contact-field updates for the resolved
/// passenger.
pub async fn update_passenger_details(
    services: Services,
    params: Value,
) -> Result<Value, DomainError> {
    let passenger = reconcile::resolve_passenger(&services, &params).await?;

    let new_email = reconcile::opt_str(&params, &["new_email"]);
    let new_phone = reconcile::opt_str(&params, &["new_phone", "phone"]);
    if new_email.is_none() && new_phone.is_none() {
        return Err(DomainError::invalid_parameter(
            "new_email",
            "Provide a new_email or new_phone to update",
        ));
    }

    let updated = services
        .passengers
        .update_contact(passenger.id, new_email, new_phone)
        .await?;

    Ok(json!({
        "passenger": {
            "first_name": updated.first_name,
            "last_name": updated.last_name,
            "email": updated.email,
            "phone": updated.phone,
            "tier": updated.tier,
        },
        "message": "Contact details updated",
    }))
}
