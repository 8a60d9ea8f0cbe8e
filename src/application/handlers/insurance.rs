//! Travel insurance operations.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use crate::application::{reconcile, Services};
use crate::domain::foundation::refs::generate_policy_number;
use crate::domain::foundation::{DomainError, ErrorCode, Money};
use crate::domain::model::{InsurancePolicy, InsuranceType, NewInsurancePolicy};

use super::{load_booking, refuse_terminal};

const PROVIDER: &str = "HorizonShield";

/// Flat premium and coverage per product.
fn product_terms(insurance_type: InsuranceType, currency: &str) -> (Money, Money) {
    let (premium, coverage) = match insurance_type {
        InsuranceType::Flight => (25, 10_000),
        InsuranceType::Trip => (40, 25_000),
        InsuranceType::Comprehensive => (65, 50_000),
        InsuranceType::Premium => (95, 100_000),
    };
    (
        Money::new(Decimal::from(premium), currency),
        Money::new(Decimal::from(coverage), currency),
    )
}

fn policy_json(policy: &InsurancePolicy) -> Value {
    json!({
        "policy_number": policy.policy_number,
        "type": policy.insurance_type,
        "coverage_amount": policy.coverage_amount,
        "premium": policy.premium,
        "valid_from": policy.valid_from,
        "valid_until": policy.valid_until,
        "status": policy.status,
        "provider": policy.provider,
    })
}

/// `purchase_flight_insurance` - attaches a policy to a live booking,
/// valid through the day after the final arrival.
pub async fn purchase_flight_insurance(
    services: Services,
    params: Value,
) -> Result<Value, DomainError> {
    let detail = load_booking(&services, &params).await?;
    refuse_terminal(&detail, "insured")?;

    let insurance_type = match reconcile::opt_str(&params, &["insurance_type", "coverage", "plan"])
    {
        Some(raw) => InsuranceType::from_str(&raw.to_lowercase()).ok_or_else(|| {
            DomainError::invalid_parameter(
                "insurance_type",
                format!("Unknown insurance type '{}'", raw),
            )
        })?,
        None => InsuranceType::Flight,
    };

    let last_arrival = detail
        .segments
        .iter()
        .map(|s| s.flight.flight.scheduled_arrival)
        .max()
        .ok_or_else(|| {
            DomainError::internal(format!(
                "booking {} has no segments",
                detail.booking.reference
            ))
        })?;

    let (premium, coverage) = product_terms(insurance_type, "USD");
    let policy_number = loop {
        let candidate = {
            let mut rng = rand::thread_rng();
            generate_policy_number(&mut rng)
        };
        if services.insurance.by_policy_number(&candidate).await?.is_none() {
            break candidate;
        }
    };

    let created = services
        .insurance
        .create(NewInsurancePolicy {
            policy_number,
            booking_id: detail.booking.id,
            passenger_id: detail.passenger.id,
            insurance_type,
            coverage_amount: coverage,
            premium,
            valid_from: Utc::now(),
            valid_until: last_arrival + Duration::days(1),
            provider: PROVIDER.to_string(),
        })
        .await?;

    Ok(json!({
        "booking_reference": detail.booking.reference,
        "policy": policy_json(&created),
    }))
}

/// `get_insurance_details` - a policy by its `HJ` number, or every policy
/// on a booking.
pub async fn get_insurance_details(services: Services, params: Value) -> Result<Value, DomainError> {
    if let Some(raw) = reconcile::opt_str(&params, &["policy_number", "policy_id"]) {
        let number = raw.to_uppercase();
        let found = services
            .insurance
            .by_policy_number(&number)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::InvalidParameter,
                    format!("No insurance policy found for {}", number),
                )
            })?;
        return Ok(json!({"policy": policy_json(&found)}));
    }

    let detail = load_booking(&services, &params).await?;
    let policies = services.insurance.for_booking(detail.booking.id).await?;
    Ok(json!({
        "booking_reference": detail.booking.reference,
        "policies": policies.iter().map(policy_json).collect::<Vec<_>>(),
    }))
}
