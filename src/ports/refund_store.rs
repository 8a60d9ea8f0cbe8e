//! Port for refund records.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::model::{NewRefund, Refund};

#[async_trait]
pub trait RefundStore: Send + Sync {
    async fn refunds_for_booking(&self, booking_id: i64) -> Result<Vec<Refund>, DomainError>;

    /// Whether a pending or approved refund exists for the booking.
    async fn open_refund_exists(&self, booking_id: i64) -> Result<bool, DomainError>;

    async fn by_reference(&self, reference: &str) -> Result<Option<Refund>, DomainError>;

    /// Records the refund and flips the booking to `refund_requested`,
    /// atomically.
    async fn request_refund(
        &self,
        booking_id: i64,
        refund: NewRefund,
    ) -> Result<Refund, DomainError>;
}
