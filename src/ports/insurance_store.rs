//! Port for travel insurance policies.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::model::{InsurancePolicy, NewInsurancePolicy};

#[async_trait]
pub trait InsuranceStore: Send + Sync {
    async fn create(&self, policy: NewInsurancePolicy) -> Result<InsurancePolicy, DomainError>;

    async fn by_policy_number(&self, number: &str)
        -> Result<Option<InsurancePolicy>, DomainError>;

    async fn for_booking(&self, booking_id: i64) -> Result<Vec<InsurancePolicy>, DomainError>;
}
