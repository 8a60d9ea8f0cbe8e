//! PostgreSQL implementation of RefundStore.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::foundation::DomainError;
use crate::domain::model::{NewRefund, Refund, RefundMethod, RefundStatus, RefundType};
use crate::ports::RefundStore;

use super::{db_err, money_from_row, parse_enum};

pub(crate) const REFUND_COLUMNS: &str = "id, reference, booking_id, trip_booking_id, refund_type, \
     amount, currency, reason, status, method, requested_at, processed_at";

pub(crate) fn row_to_refund(row: &PgRow) -> Result<Refund, DomainError> {
    let refund_type: String = row.try_get("refund_type").map_err(db_err("refund row"))?;
    let status: String = row.try_get("status").map_err(db_err("refund row"))?;
    let method: String = row.try_get("method").map_err(db_err("refund row"))?;
    Ok(Refund {
        id: row.try_get("id").map_err(db_err("refund row"))?,
        reference: row.try_get("reference").map_err(db_err("refund row"))?,
        booking_id: row.try_get("booking_id").map_err(db_err("refund row"))?,
        trip_booking_id: row
            .try_get("trip_booking_id")
            .map_err(db_err("refund row"))?,
        refund_type: parse_enum(&refund_type, RefundType::from_str, "refund type")?,
        amount: money_from_row(row, "amount", "currency")?,
        reason: row.try_get("reason").map_err(db_err("refund row"))?,
        status: parse_enum(&status, RefundStatus::from_str, "refund status")?,
        method: parse_enum(&method, RefundMethod::from_str, "refund method")?,
        requested_at: row.try_get("requested_at").map_err(db_err("refund row"))?,
        processed_at: row.try_get("processed_at").map_err(db_err("refund row"))?,
    })
}

/// PostgreSQL implementation of RefundStore.
#[derive(Clone)]
pub struct PgRefundStore {
    pool: PgPool,
}

impl PgRefundStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefundStore for PgRefundStore {
    async fn refunds_for_booking(&self, booking_id: i64) -> Result<Vec<Refund>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM refunds WHERE booking_id = $1 ORDER BY requested_at DESC",
            REFUND_COLUMNS
        ))
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("failed to fetch refunds for booking"))?;
        rows.iter().map(row_to_refund).collect()
    }

    async fn open_refund_exists(&self, booking_id: i64) -> Result<bool, DomainError> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS( \
               SELECT 1 FROM refunds \
               WHERE booking_id = $1 AND status IN ('pending', 'approved'))",
        )
        .bind(booking_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("failed to check open refunds"))?;
        Ok(row.0)
    }

    async fn by_reference(&self, reference: &str) -> Result<Option<Refund>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM refunds WHERE UPPER(reference) = UPPER($1)",
            REFUND_COLUMNS
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("failed to fetch refund by reference"))?;
        row.as_ref().map(row_to_refund).transpose()
    }

    async fn request_refund(
        &self,
        booking_id: i64,
        refund: NewRefund,
    ) -> Result<Refund, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("failed to begin transaction"))?;

        let row = sqlx::query(&format!(
            "INSERT INTO refunds \
             (reference, booking_id, refund_type, amount, currency, reason, status, method, \
              requested_at) \
             VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7, NOW()) \
             RETURNING {}",
            REFUND_COLUMNS
        ))
        .bind(&refund.reference)
        .bind(booking_id)
        .bind(refund.refund_type.as_str())
        .bind(refund.amount.amount)
        .bind(&refund.amount.currency)
        .bind(&refund.reason)
        .bind(refund.method.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err("failed to insert refund"))?;

        sqlx::query("UPDATE bookings SET status = 'refund_requested' WHERE id = $1")
            .bind(booking_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err("failed to flag booking for refund"))?;

        tx.commit().await.map_err(db_err("failed to commit transaction"))?;
        row_to_refund(&row)
    }
}
