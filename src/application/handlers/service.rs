//! Customer-service operations: escalation, callbacks, complaints, and
//! loyalty lookups. Every interaction lands in the append-only log.

use serde_json::{json, Value};

use crate::application::{reconcile, Services};
use crate::domain::foundation::refs::{generate_callback_reference, generate_case_number};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::model::{InteractionKind, NewServiceLog, PassengerTier};
use crate::domain::rules::escalation;

const REASON_KEYS: &[&str] = &["reason", "issue", "description", "message"];

/// Optional passenger context; service operations never fail for want of
/// identification.
async fn optional_passenger_id(
    services: &Services,
    params: &Value,
) -> Result<Option<i64>, DomainError> {
    match reconcile::resolve_passenger(services, params).await {
        Ok(passenger) => Ok(Some(passenger.id)),
        Err(err) if err.code == ErrorCode::PassengerNotFound => Ok(None),
        Err(err) => Err(err),
    }
}

async fn optional_booking_reference(
    services: &Services,
    params: &Value,
) -> Result<Option<String>, DomainError> {
    let Some(reference) = reconcile::opt_booking_reference(params)? else {
        return Ok(None);
    };
    Ok(services
        .bookings
        .by_reference(&reference)
        .await?
        .map(|d| d.booking.reference))
}

/// `escalate_to_human_agent` - opens a case, classifying urgency from the
/// stated reason.
pub async fn escalate_to_human_agent(services: Services, params: Value) -> Result<Value, DomainError> {
    let reason = reconcile::require_str(&params, REASON_KEYS)?;
    let assessment = escalation::assess(reason);

    let passenger_id = optional_passenger_id(&services, &params).await?;
    let booking_reference = optional_booking_reference(&services, &params).await?;
    let case_number = {
        let mut rng = rand::thread_rng();
        generate_case_number(&mut rng)
    };

    let entry = services
        .service_log
        .append(NewServiceLog {
            case_number,
            kind: InteractionKind::Escalation,
            passenger_id,
            booking_reference,
            reason: reason.to_string(),
            priority: assessment.priority.as_str().to_string(),
            contact_phone: reconcile::opt_str(&params, &["phone", "contact_phone"])
                .map(str::to_string),
            preferred_time: None,
        })
        .await?;

    Ok(json!({
        "case_number": entry.case_number,
        "priority": assessment.priority,
        "estimated_wait": assessment.estimated_wait,
        "message": "A customer service agent will be with you shortly",
    }))
}

/// `schedule_callback` - books a callback slot; the phone number is
/// required, the time window is free-form.
pub async fn schedule_callback(services: Services, params: Value) -> Result<Value, DomainError> {
    let phone = reconcile::require_str(&params, &["phone", "contact_phone", "phone_number"])?;
    let reason = reconcile::opt_str(&params, REASON_KEYS).unwrap_or("Callback requested");
    let preferred_time = reconcile::opt_str(&params, &["preferred_time", "time", "callback_time"]);

    let passenger_id = optional_passenger_id(&services, &params).await?;
    let booking_reference = optional_booking_reference(&services, &params).await?;
    let reference = {
        let mut rng = rand::thread_rng();
        generate_callback_reference(&mut rng)
    };

    let entry = services
        .service_log
        .append(NewServiceLog {
            case_number: reference,
            kind: InteractionKind::Callback,
            passenger_id,
            booking_reference,
            reason: reason.to_string(),
            priority: "normal".to_string(),
            contact_phone: Some(phone.to_string()),
            preferred_time: preferred_time.map(str::to_string),
        })
        .await?;

    Ok(json!({
        "callback_reference": entry.case_number,
        "phone": phone,
        "preferred_time": entry.preferred_time,
        "message": "Your callback has been scheduled",
    }))
}

/// `file_complaint` - records a complaint case for follow-up.
pub async fn file_complaint(services: Services, params: Value) -> Result<Value, DomainError> {
    let description = reconcile::require_str(&params, &["complaint", "description", "reason", "issue"])?;

    let passenger_id = optional_passenger_id(&services, &params).await?;
    let booking_reference = optional_booking_reference(&services, &params).await?;
    let case_number = {
        let mut rng = rand::thread_rng();
        generate_case_number(&mut rng)
    };

    let entry = services
        .service_log
        .append(NewServiceLog {
            case_number,
            kind: InteractionKind::Complaint,
            passenger_id,
            booking_reference,
            reason: description.to_string(),
            priority: escalation::assess(description).priority.as_str().to_string(),
            contact_phone: reconcile::opt_str(&params, &["phone", "contact_phone"])
                .map(str::to_string),
            preferred_time: None,
        })
        .await?;

    Ok(json!({
        "case_number": entry.case_number,
        "status": "received",
        "message": "Your complaint has been filed; a case manager will respond within 2 business days",
    }))
}

/// Tier perks quoted alongside loyalty lookups.
fn tier_benefits(tier: PassengerTier) -> Vec<&'static str> {
    match tier {
        PassengerTier::Basic => vec!["Standard baggage allowance"],
        PassengerTier::Silver => {
            vec!["1.2x checked baggage allowance", "Priority check-in"]
        }
        PassengerTier::Gold => vec![
            "1.5x checked baggage allowance",
            "Priority check-in",
            "Lounge access",
        ],
        PassengerTier::Platinum => vec![
            "2x checked baggage allowance",
            "Priority check-in",
            "Lounge access",
            "Complimentary upgrades when available",
        ],
    }
}

/// `get_frequent_flyer_info` - loyalty profile by frequent flyer number or
/// any other passenger identifier.
pub async fn get_frequent_flyer_info(services: Services, params: Value) -> Result<Value, DomainError> {
    let passenger = match reconcile::opt_str(
        &params,
        &["frequent_flyer_number", "loyalty_number", "ff_number"],
    ) {
        Some(raw) => {
            let number = raw.to_uppercase();
            services
                .passengers
                .by_frequent_flyer_number(&number)
                .await?
                .ok_or_else(|| {
                    DomainError::new(
                        ErrorCode::PassengerNotFound,
                        format!("No frequent flyer found for {}", number),
                    )
                })?
        }
        None => reconcile::resolve_passenger(&services, &params).await?,
    };

    Ok(json!({
        "passenger_name": passenger.full_name(),
        "frequent_flyer_number": passenger.frequent_flyer_number,
        "tier": passenger.tier,
        "benefits": tier_benefits(passenger.tier),
    }))
}
