//! Trip package and excursion operations.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use crate::application::{reconcile, Services};
use crate::domain::foundation::refs::{generate_booking_reference, generate_refund_reference};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::model::{
    Excursion, NewExcursionBooking, NewRefund, NewTripBooking, RefundMethod, TripBookingDetail,
    TripBookingStatus, TripPackage,
};
use crate::domain::rules::{fees, packages, refund as refund_rules};

const TRIP_REFERENCE_KEYS: &[&str] =
    &["trip_reference", "booking_reference", "reference", "confirmation_number"];

fn package_json(package: &TripPackage) -> Value {
    json!({
        "code": package.code,
        "name": package.name,
        "destination": package.destination,
        "category": package.category,
        "description": package.description,
        "duration_days": package.duration_days,
        "price": package.price,
    })
}

fn excursion_json(excursion: &Excursion) -> Value {
    json!({
        "code": excursion.code,
        "name": excursion.name,
        "destination": excursion.destination,
        "description": excursion.description,
        "duration_hours": excursion.duration_hours,
        "price": excursion.price,
    })
}

fn trip_booking_json(detail: &TripBookingDetail) -> Value {
    json!({
        "trip_reference": detail.trip_booking.reference,
        "status": detail.trip_booking.status,
        "start_date": detail.trip_booking.start_date,
        "end_date": detail.trip_booking.end_date,
        "travelers": detail.trip_booking.travelers,
        "total": detail.trip_booking.total,
        "package": package_json(&detail.package),
        "excursions": detail.excursions.iter().map(|e| json!({
            "excursion_id": e.excursion_id,
            "excursion_date": e.excursion_date,
            "participants": e.participants,
            "total": e.total,
        })).collect::<Vec<_>>(),
    })
}

/// Interests may arrive as an array or a comma-separated string.
fn interests(params: &Value) -> Vec<String> {
    for key in ["interests", "keywords", "preferences"] {
        match params.get(key) {
            Some(Value::Array(items)) => {
                return items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
            Some(Value::String(s)) => {
                return s
                    .split(',')
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect();
            }
            _ => continue,
        }
    }
    Vec::new()
}

async fn load_trip_booking(
    services: &Services,
    params: &Value,
) -> Result<TripBookingDetail, DomainError> {
    let reference = reconcile::require_str(params, TRIP_REFERENCE_KEYS)?.to_uppercase();
    services
        .trips
        .trip_booking_by_reference(&reference)
        .await?
        .ok_or_else(|| {
            DomainError::new(
                ErrorCode::BookingNotFound,
                format!("No trip booking found for reference {}", reference),
            )
        })
}

fn refuse_terminal_trip(detail: &TripBookingDetail, action: &str) -> Result<(), DomainError> {
    match detail.trip_booking.status {
        TripBookingStatus::Cancelled => Err(DomainError::new(
            ErrorCode::AlreadyCancelled,
            format!(
                "Trip booking {} is already cancelled and cannot be {}",
                detail.trip_booking.reference, action
            ),
        )),
        TripBookingStatus::Refunded => Err(DomainError::new(
            ErrorCode::AlreadyRefunded,
            format!(
                "Trip booking {} has been refunded and cannot be {}",
                detail.trip_booking.reference, action
            ),
        )),
        TripBookingStatus::Confirmed => Ok(()),
    }
}

/// `search_trip_packages` - packages at a destination, ranked by interest
/// match when interests are given, cheapest-first otherwise.
pub async fn search_trip_packages(services: Services, params: Value) -> Result<Value, DomainError> {
    let destination = reconcile::opt_str(&params, &["destination", "location", "city"]);
    let found = services.trips.packages(destination).await?;
    let wanted = interests(&params);

    let listed: Vec<Value> = if wanted.is_empty() {
        let mut sorted = found;
        sorted.sort_by(|a, b| a.price.amount.cmp(&b.price.amount));
        sorted.iter().map(package_json).collect()
    } else {
        packages::rank_packages(found, &wanted)
            .into_iter()
            .map(|(p, score)| {
                let mut rendered = package_json(&p);
                rendered["match_score"] = json!(score);
                rendered
            })
            .collect()
    };

    Ok(json!({"packages": listed}))
}

/// `get_trip_package_details` - one package by code.
pub async fn get_trip_package_details(
    services: Services,
    params: Value,
) -> Result<Value, DomainError> {
    let code = reconcile::require_str(&params, &["package_code", "code", "package_id"])?
        .to_uppercase();
    let package = services.trips.package_by_code(&code).await?.ok_or_else(|| {
        DomainError::new(
            ErrorCode::InvalidParameter,
            format!("No trip package found for code {}", code),
        )
    })?;
    Ok(json!({"package": package_json(&package)}))
}

/// `book_trip_package` - books a package for the resolved passenger. The
/// end date derives from the package duration; the total is price times
/// travelers.
pub async fn book_trip_package(services: Services, params: Value) -> Result<Value, DomainError> {
    let passenger = reconcile::resolve_passenger(&services, &params).await?;
    let code = reconcile::require_str(&params, &["package_code", "code", "package_id"])?
        .to_uppercase();
    let package = services.trips.package_by_code(&code).await?.ok_or_else(|| {
        DomainError::new(
            ErrorCode::InvalidParameter,
            format!("No trip package found for code {}", code),
        )
    })?;

    let start_date = reconcile::date(&params, &["start_date", "departure_date", "date"])?;
    let party = reconcile::party_size(&params)?;
    let travelers = party.total() as i32;
    let end_date = start_date + Duration::days(i64::from(package.duration_days));
    let total = package.price.scale(Decimal::from(travelers));

    let reference = loop {
        let candidate = {
            let mut rng = rand::thread_rng();
            generate_booking_reference(&mut rng)
        };
        if !services.trips.trip_reference_exists(&candidate).await? {
            break candidate;
        }
    };

    let created = services
        .trips
        .book(NewTripBooking {
            reference,
            package_id: package.id,
            passenger_id: passenger.id,
            start_date,
            end_date,
            travelers,
            total,
        })
        .await?;

    Ok(json!({
        "trip_reference": created.reference,
        "status": created.status,
        "package": package_json(&package),
        "start_date": created.start_date,
        "end_date": created.end_date,
        "travelers": created.travelers,
        "total": created.total,
    }))
}

/// `get_trip_booking_details` - the trip booking read model.
pub async fn get_trip_booking_details(
    services: Services,
    params: Value,
) -> Result<Value, DomainError> {
    let detail = load_trip_booking(&services, &params).await?;
    Ok(trip_booking_json(&detail))
}

/// `cancel_trip_package` - cancels a trip booking under the same fee tiers
/// as flight cancellations, measured against the trip start.
pub async fn cancel_trip_package(services: Services, params: Value) -> Result<Value, DomainError> {
    let detail = load_trip_booking(&services, &params).await?;
    refuse_terminal_trip(&detail, "cancelled again")?;

    let start = detail
        .trip_booking
        .start_date
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| DomainError::internal("invalid trip start date"))?;
    let fee = fees::cancellation_fee(&detail.trip_booking.total, start - Utc::now())?;
    let (amount, refund_type) = refund_rules::refund_amount(&detail.trip_booking.total, &fee)?;

    let reference = {
        let mut rng = rand::thread_rng();
        generate_refund_reference(&mut rng)
    };
    let created = services
        .trips
        .cancel_trip_booking(
            detail.trip_booking.id,
            NewRefund {
                reference,
                refund_type,
                amount: amount.clone(),
                reason: reconcile::opt_str(&params, &["reason"])
                    .unwrap_or("Customer requested trip cancellation")
                    .to_string(),
                method: RefundMethod::CreditCard,
            },
        )
        .await?;

    Ok(json!({
        "trip_reference": detail.trip_booking.reference,
        "status": TripBookingStatus::Cancelled,
        "cancellation_fee": fee,
        "refund_amount": amount,
        "refund": {
            "reference": created.reference,
            "type": created.refund_type,
            "status": created.status,
            "processing_time": refund_rules::processing_time(created.method),
        },
    }))
}

/// `search_excursions` - activities at a destination.
pub async fn search_excursions(services: Services, params: Value) -> Result<Value, DomainError> {
    let destination = reconcile::opt_str(&params, &["destination", "location", "city"]);
    let found = services.trips.excursions(destination).await?;
    Ok(json!({
        "excursions": found.iter().map(excursion_json).collect::<Vec<_>>(),
    }))
}

/// `book_excursion` - attaches an excursion to a confirmed trip booking.
/// The excursion date must fall inside the trip.
pub async fn book_excursion(services: Services, params: Value) -> Result<Value, DomainError> {
    let detail = load_trip_booking(&services, &params).await?;
    refuse_terminal_trip(&detail, "extended")?;

    let code = reconcile::require_str(&params, &["excursion_code", "code", "excursion_id"])?
        .to_uppercase();
    let excursion = services.trips.excursion_by_code(&code).await?.ok_or_else(|| {
        DomainError::new(
            ErrorCode::InvalidParameter,
            format!("No excursion found for code {}", code),
        )
    })?;

    let excursion_date = reconcile::opt_date(&params, &["excursion_date", "date"])?
        .unwrap_or(detail.trip_booking.start_date);
    if excursion_date < detail.trip_booking.start_date
        || excursion_date > detail.trip_booking.end_date
    {
        return Err(DomainError::invalid_parameter(
            "excursion_date",
            format!(
                "Excursion date must fall within the trip ({} to {})",
                detail.trip_booking.start_date, detail.trip_booking.end_date
            ),
        ));
    }

    let participants = reconcile::party_size(&params)?.total() as i32;
    let total = excursion.price.scale(Decimal::from(participants));

    let created = services
        .trips
        .book_excursion(NewExcursionBooking {
            trip_booking_id: detail.trip_booking.id,
            excursion_id: excursion.id,
            excursion_date,
            participants,
            total,
        })
        .await?;

    Ok(json!({
        "trip_reference": detail.trip_booking.reference,
        "excursion": excursion_json(&excursion),
        "excursion_date": created.excursion_date,
        "participants": created.participants,
        "total": created.total,
    }))
}
