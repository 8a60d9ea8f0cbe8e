//! Port for the static airline-policy table.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::model::{AirlinePolicy, CabinClass, RouteType};

#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Policy rows surviving the given filters; `None` means no filter.
    async fn find(
        &self,
        category: Option<&str>,
        route_type: Option<RouteType>,
        cabin_class: Option<CabinClass>,
    ) -> Result<Vec<AirlinePolicy>, DomainError>;
}
