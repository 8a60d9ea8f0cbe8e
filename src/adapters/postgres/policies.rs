//! PostgreSQL implementation of PolicyStore.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::foundation::DomainError;
use crate::domain::model::{AirlinePolicy, CabinClass, RouteType};
use crate::ports::PolicyStore;

use super::{db_err, parse_enum};

fn row_to_policy(row: &PgRow) -> Result<AirlinePolicy, DomainError> {
    let route_type: Option<String> =
        row.try_get("route_type").map_err(db_err("policy row"))?;
    let cabin_class: Option<String> =
        row.try_get("cabin_class").map_err(db_err("policy row"))?;
    Ok(AirlinePolicy {
        id: row.try_get("id").map_err(db_err("policy row"))?,
        category: row.try_get("category").map_err(db_err("policy row"))?,
        route_type: route_type
            .map(|s| parse_enum(&s, RouteType::from_str, "route type"))
            .transpose()?,
        cabin_class: cabin_class
            .map(|s| parse_enum(&s, CabinClass::from_str, "cabin class"))
            .transpose()?,
        title: row.try_get("title").map_err(db_err("policy row"))?,
        body: row.try_get("body").map_err(db_err("policy row"))?,
    })
}

/// PostgreSQL implementation of PolicyStore.
#[derive(Clone)]
pub struct PgPolicyStore {
    pool: PgPool,
}

impl PgPolicyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PolicyStore for PgPolicyStore {
    async fn find(
        &self,
        category: Option<&str>,
        route_type: Option<RouteType>,
        cabin_class: Option<CabinClass>,
    ) -> Result<Vec<AirlinePolicy>, DomainError> {
        // A NULL filter column on a row means the row applies to every value.
        let rows = sqlx::query(
            "SELECT id, category, route_type, cabin_class, title, body \
             FROM airline_policies \
             WHERE ($1::text IS NULL OR LOWER(category) = LOWER($1)) \
               AND ($2::text IS NULL OR route_type IS NULL OR route_type = $2) \
               AND ($3::text IS NULL OR cabin_class IS NULL OR cabin_class = $3) \
             ORDER BY category, id",
        )
        .bind(category)
        .bind(route_type.map(|r| r.as_str()))
        .bind(cabin_class.map(|c| c.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("failed to fetch airline policies"))?;
        rows.iter().map(row_to_policy).collect()
    }
}
