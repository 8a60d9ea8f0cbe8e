//! Port for the database liveness probe.

use async_trait::async_trait;

/// `SELECT 1` style reachability check backing `/health`.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn ping(&self) -> bool;
}
