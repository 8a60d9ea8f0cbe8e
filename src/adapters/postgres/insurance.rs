//! PostgreSQL implementation of InsuranceStore.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::foundation::DomainError;
use crate::domain::model::{InsurancePolicy, InsuranceStatus, InsuranceType, NewInsurancePolicy};
use crate::ports::InsuranceStore;

use super::{db_err, money_from_row, parse_enum};

const POLICY_COLUMNS: &str = "id, policy_number, booking_id, passenger_id, insurance_type, \
     coverage_amount, coverage_currency, premium_amount, premium_currency, valid_from, \
     valid_until, status, provider";

fn row_to_policy(row: &PgRow) -> Result<InsurancePolicy, DomainError> {
    let insurance_type: String = row
        .try_get("insurance_type")
        .map_err(db_err("insurance policy row"))?;
    let status: String = row.try_get("status").map_err(db_err("insurance policy row"))?;
    Ok(InsurancePolicy {
        id: row.try_get("id").map_err(db_err("insurance policy row"))?,
        policy_number: row
            .try_get("policy_number")
            .map_err(db_err("insurance policy row"))?,
        booking_id: row
            .try_get("booking_id")
            .map_err(db_err("insurance policy row"))?,
        passenger_id: row
            .try_get("passenger_id")
            .map_err(db_err("insurance policy row"))?,
        insurance_type: parse_enum(&insurance_type, InsuranceType::from_str, "insurance type")?,
        coverage_amount: money_from_row(row, "coverage_amount", "coverage_currency")?,
        premium: money_from_row(row, "premium_amount", "premium_currency")?,
        valid_from: row
            .try_get("valid_from")
            .map_err(db_err("insurance policy row"))?,
        valid_until: row
            .try_get("valid_until")
            .map_err(db_err("insurance policy row"))?,
        status: parse_enum(&status, InsuranceStatus::from_str, "insurance status")?,
        provider: row.try_get("provider").map_err(db_err("insurance policy row"))?,
    })
}

/// PostgreSQL implementation of InsuranceStore.
#[derive(Clone)]
pub struct PgInsuranceStore {
    pool: PgPool,
}

impl PgInsuranceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InsuranceStore for PgInsuranceStore {
    async fn create(&self, policy: NewInsurancePolicy) -> Result<InsurancePolicy, DomainError> {
        let row = sqlx::query(&format!(
            "INSERT INTO insurance_policies \
             (policy_number, booking_id, passenger_id, insurance_type, coverage_amount, \
              coverage_currency, premium_amount, premium_currency, valid_from, valid_until, \
              status, provider) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'active', $11) RETURNING {}",
            POLICY_COLUMNS
        ))
        .bind(&policy.policy_number)
        .bind(policy.booking_id)
        .bind(policy.passenger_id)
        .bind(policy.insurance_type.as_str())
        .bind(policy.coverage_amount.amount)
        .bind(&policy.coverage_amount.currency)
        .bind(policy.premium.amount)
        .bind(&policy.premium.currency)
        .bind(policy.valid_from)
        .bind(policy.valid_until)
        .bind(&policy.provider)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("failed to create insurance policy"))?;
        row_to_policy(&row)
    }

    async fn by_policy_number(
        &self,
        number: &str,
    ) -> Result<Option<InsurancePolicy>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM insurance_policies WHERE UPPER(policy_number) = UPPER($1)",
            POLICY_COLUMNS
        ))
        .bind(number)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("failed to fetch insurance policy"))?;
        row.as_ref().map(row_to_policy).transpose()
    }

    async fn for_booking(&self, booking_id: i64) -> Result<Vec<InsurancePolicy>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM insurance_policies WHERE booking_id = $1 ORDER BY valid_from DESC",
            POLICY_COLUMNS
        ))
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("failed to fetch insurance policies for booking"))?;
        rows.iter().map(row_to_policy).collect()
    }
}
