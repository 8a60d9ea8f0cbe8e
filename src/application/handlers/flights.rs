//! Flight search, status, and pricing operations.

use chrono::{Duration, Utc};
use serde_json::{json, Value};

use crate::application::{reconcile, Services};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::model::{CabinClass, FlightDetail, FlightStatusUpdate};
use crate::domain::rules::pricing;

use super::flight_json;

const ORIGIN_KEYS: &[&str] = &["origin", "origin_airport", "from", "departure_city"];
const DESTINATION_KEYS: &[&str] = &["destination", "destination_airport", "to", "arrival_city"];
const DATE_KEYS: &[&str] = &["departure_date", "date", "travel_date"];
const FLIGHT_KEYS: &[&str] = &["flight_number", "flight"];

const NO_FLIGHTS_MESSAGE: &str = "No direct flights available";

/// Looks up a flight by number, preferring an exact date match and falling
/// back to the next upcoming departure when no date is supplied.
async fn load_flight(services: &Services, params: &Value) -> Result<FlightDetail, DomainError> {
    let number = reconcile::require_str(params, FLIGHT_KEYS)?.to_uppercase();
    let found = match reconcile::opt_date(params, DATE_KEYS)? {
        Some(date) => services.flights.by_number_and_date(&number, date).await?,
        None => services.flights.next_by_number(&number).await?,
    };
    found.ok_or_else(|| {
        DomainError::new(
            ErrorCode::FlightNotFound,
            format!("No flight found for {}", number),
        )
    })
}

/// Effective times after folding in the latest status row.
fn effective_times(
    detail: &FlightDetail,
    latest: Option<&FlightStatusUpdate>,
) -> (Value, Value) {
    let departure = latest
        .and_then(|u| u.new_departure)
        .or(detail.flight.actual_departure)
        .unwrap_or(detail.flight.scheduled_departure);
    let arrival = latest
        .and_then(|u| u.new_arrival)
        .or(detail.flight.actual_arrival)
        .unwrap_or(detail.flight.scheduled_arrival);
    (json!(departure), json!(arrival))
}

/// `search_flight` - direct flights between two airports on a date, ordered
/// by quoted price then departure time. Unknown airports degrade to an
/// empty success.
pub async fn search_flight(services: Services, params: Value) -> Result<Value, DomainError> {
    let origin_raw = reconcile::require_str(&params, ORIGIN_KEYS)?;
    let destination_raw = reconcile::require_str(&params, DESTINATION_KEYS)?;
    let date = reconcile::date(&params, DATE_KEYS)?;
    let class = reconcile::cabin_class(&params)?.unwrap_or(CabinClass::Economy);

    let origin = reconcile::resolve_airport(services.reference_data.as_ref(), origin_raw).await?;
    let destination =
        reconcile::resolve_airport(services.reference_data.as_ref(), destination_raw).await?;

    let (Some(origin), Some(destination)) = (origin, destination) else {
        return Ok(json!({"flights": [], "message": NO_FLIGHTS_MESSAGE}));
    };

    let found = services.flights.search(origin.id, destination.id, date).await?;
    if found.is_empty() {
        return Ok(json!({"flights": [], "message": NO_FLIGHTS_MESSAGE}));
    }

    let today = Utc::now().date_naive();
    let mut listed = Vec::with_capacity(found.len());
    for detail in &found {
        let quote = pricing::price_quote(class, date, today, "USD");
        let open_seats = services
            .flights
            .available_seats(detail.flight.id, class)
            .await?
            .len();
        listed.push((quote.total.amount, detail.flight.scheduled_departure, json!({
            "flight": flight_json(detail),
            "class": class,
            "price": quote.total,
            "price_band": {"low": quote.band_low, "high": quote.band_high},
            "available_seats": open_seats,
        })));
    }
    listed.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

    Ok(json!({
        "flights": listed.into_iter().map(|(_, _, v)| v).collect::<Vec<_>>(),
    }))
}

/// `get_flight_details` - one flight with route and schedule.
pub async fn get_flight_details(services: Services, params: Value) -> Result<Value, DomainError> {
    let detail = load_flight(&services, &params).await?;
    let latest = services
        .flights
        .latest_status_update(detail.flight.id)
        .await?;
    Ok(json!({
        "flight": flight_json(&detail),
        "latest_update": latest,
    }))
}

/// `get_flight_status` - current status with the latest delay row folded in.
pub async fn get_flight_status(services: Services, params: Value) -> Result<Value, DomainError> {
    let detail = load_flight(&services, &params).await?;
    let latest = services
        .flights
        .latest_status_update(detail.flight.id)
        .await?;
    let (departure, arrival) = effective_times(&detail, latest.as_ref());

    Ok(json!({
        "flight_number": detail.flight.flight_number,
        "status": detail.flight.status,
        "scheduled_departure": detail.flight.scheduled_departure,
        "scheduled_arrival": detail.flight.scheduled_arrival,
        "estimated_departure": departure,
        "estimated_arrival": arrival,
        "delay_minutes": latest.as_ref().and_then(|u| u.delay_minutes),
        "delay_reason": latest.as_ref().and_then(|u| u.reason.clone()),
        "gate": latest
            .as_ref()
            .and_then(|u| u.gate_change.clone())
            .or_else(|| detail.flight.gate.clone()),
        "terminal": detail.flight.terminal,
    }))
}

/// `check_flight_availability` - open seats per class.
pub async fn check_flight_availability(
    services: Services,
    params: Value,
) -> Result<Value, DomainError> {
    let detail = load_flight(&services, &params).await?;
    let wanted = reconcile::cabin_class(&params)?;

    let classes: Vec<CabinClass> = match wanted {
        Some(class) => vec![class],
        None => vec![
            CabinClass::Economy,
            CabinClass::PremiumEconomy,
            CabinClass::Business,
            CabinClass::First,
        ],
    };

    let mut availability = Vec::with_capacity(classes.len());
    for class in classes {
        let open = services
            .flights
            .available_seats(detail.flight.id, class)
            .await?
            .len();
        availability.push(json!({"class": class, "available_seats": open}));
    }

    Ok(json!({
        "flight_number": detail.flight.flight_number,
        "departure_date": detail.flight.scheduled_departure.date_naive(),
        "availability": availability,
    }))
}

/// `search_flight_prices` - deterministic quotes per class for a route/date.
pub async fn search_flight_prices(services: Services, params: Value) -> Result<Value, DomainError> {
    let origin_raw = reconcile::require_str(&params, ORIGIN_KEYS)?;
    let destination_raw = reconcile::require_str(&params, DESTINATION_KEYS)?;
    let date = reconcile::date(&params, DATE_KEYS)?;
    let wanted = reconcile::cabin_class(&params)?;

    let origin = reconcile::resolve_airport(services.reference_data.as_ref(), origin_raw).await?;
    let destination =
        reconcile::resolve_airport(services.reference_data.as_ref(), destination_raw).await?;

    let (Some(origin), Some(destination)) = (origin, destination) else {
        return Ok(json!({"prices": [], "message": NO_FLIGHTS_MESSAGE}));
    };

    let classes: Vec<CabinClass> = match wanted {
        Some(class) => vec![class],
        None => vec![
            CabinClass::Economy,
            CabinClass::PremiumEconomy,
            CabinClass::Business,
            CabinClass::First,
        ],
    };

    let today = Utc::now().date_naive();
    let prices: Vec<Value> = classes
        .into_iter()
        .map(|class| json!(pricing::price_quote(class, date, today, "USD")))
        .collect();

    Ok(json!({
        "origin": origin.iata_code,
        "destination": destination.iata_code,
        "departure_date": date,
        "prices": prices,
    }))
}

/// `get_arrival_time` - scheduled and estimated arrival.
pub async fn get_arrival_time(services: Services, params: Value) -> Result<Value, DomainError> {
    let detail = load_flight(&services, &params).await?;
    let latest = services
        .flights
        .latest_status_update(detail.flight.id)
        .await?;
    let (_, arrival) = effective_times(&detail, latest.as_ref());

    Ok(json!({
        "flight_number": detail.flight.flight_number,
        "scheduled_arrival": detail.flight.scheduled_arrival,
        "estimated_arrival": arrival,
        "delay_minutes": latest.as_ref().and_then(|u| u.delay_minutes),
        "destination": detail.destination.iata_code,
        "timezone": detail.destination.timezone,
    }))
}

/// `get_departure_time` - scheduled and estimated departure.
pub async fn get_departure_time(services: Services, params: Value) -> Result<Value, DomainError> {
    let detail = load_flight(&services, &params).await?;
    let latest = services
        .flights
        .latest_status_update(detail.flight.id)
        .await?;
    let (departure, _) = effective_times(&detail, latest.as_ref());

    let boarding = detail.flight.scheduled_departure - Duration::minutes(40);
    Ok(json!({
        "flight_number": detail.flight.flight_number,
        "scheduled_departure": detail.flight.scheduled_departure,
        "estimated_departure": departure,
        "boarding_time": boarding,
        "delay_minutes": latest.as_ref().and_then(|u| u.delay_minutes),
        "origin": detail.origin.iata_code,
        "timezone": detail.origin.timezone,
    }))
}
