//! PostgreSQL implementation of ServiceLogStore.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::foundation::DomainError;
use crate::domain::model::{CustomerServiceLog, InteractionKind, NewServiceLog};
use crate::ports::ServiceLogStore;

use super::{db_err, parse_enum};

fn row_to_log(row: &PgRow) -> Result<CustomerServiceLog, DomainError> {
    let kind: String = row.try_get("kind").map_err(db_err("service log row"))?;
    Ok(CustomerServiceLog {
        id: row.try_get("id").map_err(db_err("service log row"))?,
        case_number: row.try_get("case_number").map_err(db_err("service log row"))?,
        kind: parse_enum(&kind, InteractionKind::from_str, "interaction kind")?,
        passenger_id: row
            .try_get("passenger_id")
            .map_err(db_err("service log row"))?,
        booking_reference: row
            .try_get("booking_reference")
            .map_err(db_err("service log row"))?,
        reason: row.try_get("reason").map_err(db_err("service log row"))?,
        priority: row.try_get("priority").map_err(db_err("service log row"))?,
        contact_phone: row
            .try_get("contact_phone")
            .map_err(db_err("service log row"))?,
        preferred_time: row
            .try_get("preferred_time")
            .map_err(db_err("service log row"))?,
        created_at: row.try_get("created_at").map_err(db_err("service log row"))?,
    })
}

/// PostgreSQL implementation of ServiceLogStore.
#[derive(Clone)]
pub struct PgServiceLogStore {
    pool: PgPool,
}

impl PgServiceLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceLogStore for PgServiceLogStore {
    async fn append(&self, entry: NewServiceLog) -> Result<CustomerServiceLog, DomainError> {
        let row = sqlx::query(
            "INSERT INTO customer_service_log \
             (case_number, kind, passenger_id, booking_reference, reason, priority, \
              contact_phone, preferred_time, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW()) \
             RETURNING id, case_number, kind, passenger_id, booking_reference, reason, \
                       priority, contact_phone, preferred_time, created_at",
        )
        .bind(&entry.case_number)
        .bind(entry.kind.as_str())
        .bind(entry.passenger_id)
        .bind(&entry.booking_reference)
        .bind(&entry.reason)
        .bind(&entry.priority)
        .bind(&entry.contact_phone)
        .bind(&entry.preferred_time)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("failed to append service log entry"))?;
        row_to_log(&row)
    }
}
