//! Baggage allowance, purchase, and tracking operations.

use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use crate::application::{reconcile, Services};
use crate::domain::foundation::{DomainError, ErrorCode, Money};
use crate::domain::model::{Baggage, BaggageType, CabinClass, NewBaggage, RouteType};
use crate::domain::rules::baggage as rules;

use super::{load_booking, refuse_terminal, target_segment};

fn opt_weight(params: &Value, keys: &[&str]) -> Result<Option<Decimal>, DomainError> {
    for key in keys {
        match params.get(key) {
            None => continue,
            Some(Value::Number(n)) => {
                let value = n
                    .as_f64()
                    .and_then(Decimal::from_f64)
                    .ok_or_else(|| {
                        DomainError::invalid_parameter(*key, "Weight must be a number")
                    })?;
                return Ok(Some(value.round_dp(1)));
            }
            Some(Value::String(s)) => {
                let value: Decimal = s.trim().parse().map_err(|_| {
                    DomainError::invalid_parameter(
                        *key,
                        format!("'{}' is not a valid weight in kg", s),
                    )
                })?;
                return Ok(Some(value.round_dp(1)));
            }
            Some(_) => {
                return Err(DomainError::invalid_parameter(*key, "Weight must be a number"));
            }
        }
    }
    Ok(None)
}

fn baggage_json(bag: &Baggage) -> Value {
    json!({
        "tag_number": bag.tag_number,
        "type": bag.baggage_type,
        "weight_kg": bag.weight_kg,
        "fee": bag.fee,
        "status": bag.status,
    })
}

/// `check_baggage_allowance` - the allowance for a booking's segments (tier
/// bonus applied), or for a bare class/route pair when no booking is named.
pub async fn check_baggage_allowance(
    services: Services,
    params: Value,
) -> Result<Value, DomainError> {
    if reconcile::opt_booking_reference(&params)?.is_some() {
        let detail = load_booking(&services, &params).await?;
        let tier = detail.passenger.tier;
        let segments: Vec<Value> = detail
            .segments
            .iter()
            .map(|segment| {
                let allowance = rules::baggage_allowance(
                    segment.segment.cabin_class,
                    segment.flight.route_type(),
                    Some(tier),
                    "USD",
                );
                json!({
                    "flight_number": segment.flight.flight.flight_number,
                    "class": segment.segment.cabin_class,
                    "route_type": segment.flight.route_type(),
                    "allowance": allowance,
                })
            })
            .collect();
        return Ok(json!({
            "booking_reference": detail.booking.reference,
            "tier": tier,
            "segments": segments,
        }));
    }

    let class = reconcile::cabin_class(&params)?.unwrap_or(CabinClass::Economy);
    let route_type = reconcile::route_type_hint(&params).unwrap_or(RouteType::International);
    let allowance = rules::baggage_allowance(class, route_type, None, "USD");
    Ok(json!({
        "class": class,
        "route_type": route_type,
        "allowance": allowance,
    }))
}

/// `get_airline_checkin_baggage_info` - an airline's published check-in and
/// baggage rules. Read-only; tier bonuses do not apply here.
pub async fn get_airline_checkin_baggage_info(
    services: Services,
    params: Value,
) -> Result<Value, DomainError> {
    let raw = reconcile::require_str(&params, &["airline", "airline_code", "airline_name"])?;
    let airline = if raw.len() == 2 {
        services.reference_data.airline_by_iata(&raw.to_uppercase()).await?
    } else {
        services
            .reference_data
            .airlines_by_name(raw)
            .await?
            .into_iter()
            .next()
    };
    let airline = airline.ok_or_else(|| {
        DomainError::invalid_parameter("airline", format!("Unknown airline '{}'", raw))
    })?;

    let allowances: Vec<Value> = [
        (CabinClass::Economy, RouteType::Domestic),
        (CabinClass::Economy, RouteType::International),
        (CabinClass::Business, RouteType::Domestic),
        (CabinClass::Business, RouteType::International),
    ]
    .into_iter()
    .map(|(class, route)| {
        json!({
            "class": class,
            "route_type": route,
            "allowance": rules::baggage_allowance(class, route, None, "USD"),
        })
    })
    .collect();

    Ok(json!({
        "airline": {
            "iata_code": airline.iata_code,
            "name": airline.name,
        },
        "check_in": {
            "opens_hours_before_departure": 24,
            "closes_hours_before_departure": {"short_haul": 1, "long_haul": 2},
            "long_haul_threshold_km": 2000,
        },
        "baggage": allowances,
    }))
}

/// `add_baggage` - registers one piece on a segment, charging the extra
/// piece fee when over the included count and per-kg excess when overweight.
pub async fn add_baggage(services: Services, params: Value) -> Result<Value, DomainError> {
    let detail = load_booking(&services, &params).await?;
    refuse_terminal(&detail, "amended")?;

    let segment = target_segment(&detail, &params)?;
    let baggage_type = match reconcile::opt_str(&params, &["baggage_type", "type"]) {
        Some(raw) => BaggageType::from_str(raw).ok_or_else(|| {
            DomainError::invalid_parameter("baggage_type", format!("Unknown baggage type '{}'", raw))
        })?,
        None => BaggageType::Checked,
    };
    let weight = opt_weight(&params, &["weight_kg", "weight"])?
        .unwrap_or_else(|| Decimal::from(23));
    if weight <= Decimal::ZERO {
        return Err(DomainError::invalid_parameter("weight_kg", "Weight must be positive"));
    }

    let allowance = rules::baggage_allowance(
        segment.segment.cabin_class,
        segment.flight.route_type(),
        Some(detail.passenger.tier),
        "USD",
    );

    let existing = services
        .bookings
        .baggage_for_booking(detail.booking.id)
        .await?
        .into_iter()
        .filter(|b| b.segment_id == segment.segment.id && b.baggage_type == BaggageType::Checked)
        .count() as i32;

    let mut fee = Money::zero("USD");
    if baggage_type == BaggageType::Checked && existing >= allowance.checked_pieces {
        fee = fee.add(&allowance.extra_piece_fee)?;
    }
    let overweight = weight - allowance.checked_weight_kg_per_piece;
    if overweight > Decimal::ZERO {
        fee = fee.add(&allowance.excess_weight_fee_per_kg.scale(overweight.ceil()))?;
    }

    let tag_number = {
        let mut rng = rand::thread_rng();
        format!("BG{:06}", rng.gen_range(0..1_000_000))
    };
    let created = services
        .bookings
        .add_baggage(NewBaggage {
            segment_id: segment.segment.id,
            baggage_type,
            weight_kg: weight,
            fee: fee.clone(),
            tag_number: Some(tag_number),
        })
        .await?;

    Ok(json!({
        "booking_reference": detail.booking.reference,
        "flight_number": segment.flight.flight.flight_number,
        "baggage": baggage_json(&created),
        "fee": fee,
        "included_pieces": allowance.checked_pieces,
        "included_weight_kg_per_piece": allowance.checked_weight_kg_per_piece,
    }))
}

/// `get_baggage_status` - tracks one piece by tag, or lists every piece on
/// a booking.
pub async fn get_baggage_status(services: Services, params: Value) -> Result<Value, DomainError> {
    if let Some(tag) = reconcile::opt_str(&params, &["tag_number", "tag", "baggage_tag"]) {
        let tag = tag.to_uppercase();
        let bag = services.bookings.baggage_by_tag(&tag).await?.ok_or_else(|| {
            DomainError::new(
                ErrorCode::InvalidParameter,
                format!("No baggage found for tag {}", tag),
            )
        })?;
        return Ok(json!({"baggage": baggage_json(&bag)}));
    }

    let detail = load_booking(&services, &params).await?;
    let bags = services.bookings.baggage_for_booking(detail.booking.id).await?;
    Ok(json!({
        "booking_reference": detail.booking.reference,
        "baggage": bags.iter().map(baggage_json).collect::<Vec<_>>(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_parses_numbers_and_strings() {
        let params = json!({"weight_kg": 23.5});
        assert_eq!(opt_weight(&params, &["weight_kg"]).unwrap(), Some("23.5".parse().unwrap()));
        let params = json!({"weight": "28"});
        assert_eq!(
            opt_weight(&params, &["weight_kg", "weight"]).unwrap(),
            Some(Decimal::from(28))
        );
    }

    #[test]
    fn absent_weight_is_none() {
        assert_eq!(opt_weight(&json!({}), &["weight_kg"]).unwrap(), None);
    }

    #[test]
    fn garbage_weight_is_rejected() {
        let err = opt_weight(&json!({"weight_kg": "heavy"}), &["weight_kg"]).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParameter);
    }
}
