//! Refund request and status operations.

use chrono::Utc;
use serde_json::{json, Value};

use crate::application::{reconcile, Services};
use crate::domain::foundation::refs::generate_refund_reference;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::model::{Refund, RefundMethod};
use crate::domain::rules::{fees, refund as rules};

use super::{load_booking, refuse_terminal};

fn refund_json(refund: &Refund) -> Value {
    json!({
        "reference": refund.reference,
        "type": refund.refund_type,
        "amount": refund.amount,
        "reason": refund.reason,
        "status": refund.status,
        "method": refund.method,
        "requested_at": refund.requested_at,
        "processed_at": refund.processed_at,
        "processing_time": rules::processing_time(refund.method),
    })
}

fn parse_method(params: &Value) -> Result<RefundMethod, DomainError> {
    match reconcile::opt_str(params, &["refund_method", "method"]) {
        Some(raw) => RefundMethod::from_str(raw).ok_or_else(|| {
            DomainError::invalid_parameter(
                "refund_method",
                format!("Unknown refund method '{}'", raw),
            )
        }),
        None => Ok(RefundMethod::CreditCard),
    }
}

/// `initiate_refund` - requests a refund for a live booking. The amount
/// follows the cancellation fee tiers; a second open request on the same
/// booking is `DuplicateRefund`.
pub async fn initiate_refund(services: Services, params: Value) -> Result<Value, DomainError> {
    let detail = load_booking(&services, &params).await?;
    refuse_terminal(&detail, "refunded")?;

    if services.refunds.open_refund_exists(detail.booking.id).await? {
        return Err(DomainError::new(
            ErrorCode::DuplicateRefund,
            format!(
                "Booking {} already has an open refund request",
                detail.booking.reference
            ),
        ));
    }

    let departure = detail.earliest_departure().ok_or_else(|| {
        DomainError::internal(format!("booking {} has no segments", detail.booking.reference))
    })?;
    let fee = fees::cancellation_fee(&detail.booking.total, departure - Utc::now())?;
    let (amount, refund_type) = rules::refund_amount(&detail.booking.total, &fee)?;
    let method = parse_method(&params)?;

    let reference = {
        let mut rng = rand::thread_rng();
        generate_refund_reference(&mut rng)
    };
    let created = services
        .refunds
        .request_refund(
            detail.booking.id,
            crate::domain::model::NewRefund {
                reference,
                refund_type,
                amount,
                reason: reconcile::opt_str(&params, &["reason"])
                    .unwrap_or("Customer requested refund")
                    .to_string(),
                method,
            },
        )
        .await?;

    Ok(json!({
        "booking_reference": detail.booking.reference,
        "booking_status": "refund_requested",
        "cancellation_fee": fee,
        "refund": refund_json(&created),
    }))
}

/// `get_refund_status` - one refund by its `RF` reference, or every refund
/// on a booking.
pub async fn get_refund_status(services: Services, params: Value) -> Result<Value, DomainError> {
    if let Some(raw) = reconcile::opt_str(&params, &["refund_reference", "refund_id"]) {
        let reference = raw.to_uppercase();
        let found = services.refunds.by_reference(&reference).await?.ok_or_else(|| {
            DomainError::new(
                ErrorCode::InvalidParameter,
                format!("No refund found for reference {}", reference),
            )
        })?;
        return Ok(json!({"refund": refund_json(&found)}));
    }

    let detail = load_booking(&services, &params).await?;
    let refunds = services.refunds.refunds_for_booking(detail.booking.id).await?;
    Ok(json!({
        "booking_reference": detail.booking.reference,
        "refunds": refunds.iter().map(refund_json).collect::<Vec<_>>(),
    }))
}
