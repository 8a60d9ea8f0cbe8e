//! Port for the customer-service interaction log.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::model::{CustomerServiceLog, NewServiceLog};

#[async_trait]
pub trait ServiceLogStore: Send + Sync {
    /// Appends one interaction row; the log is append-only.
    async fn append(&self, entry: NewServiceLog) -> Result<CustomerServiceLog, DomainError>;
}
