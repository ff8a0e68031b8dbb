//! Repository for the `routes` table, read through its airport joins.

use async_trait::async_trait;
use flighthours_core::error::CoreError;
use flighthours_core::types::DbId;

use super::ReferenceRepository;
use crate::error::read_error;
use crate::models::route::{Route, RouteFilter};
use crate::DbPool;

const SELECT_VIEW: &str = "\
    SELECT r.id, \
           r.origin_airport_id, o.iata_code AS origin_iata_code, \
           o.name AS origin_airport_name, o.country AS origin_country, \
           r.destination_airport_id, d.iata_code AS destination_iata_code, \
           d.name AS destination_airport_name, d.country AS destination_country, \
           r.airport_type, r.estimated_flight_time, \
           CONCAT(o.iata_code, '-', d.iata_code) AS route_code \
    FROM routes r \
    JOIN airports o ON o.id = r.origin_airport_id \
    JOIN airports d ON d.id = r.destination_airport_id";

pub struct PgRouteRepo {
    pool: DbPool,
}

impl PgRouteRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferenceRepository<Route, RouteFilter> for PgRouteRepo {
    async fn find_by_id(&self, id: DbId) -> Result<Option<Route>, CoreError> {
        let query = format!("{SELECT_VIEW} WHERE r.id = $1");
        sqlx::query_as::<_, Route>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error)
    }

    async fn list(&self, filter: &RouteFilter) -> Result<Vec<Route>, CoreError> {
        let query = format!(
            "{SELECT_VIEW} \
             WHERE ($1::text IS NULL OR LOWER(r.airport_type) = LOWER($1)) \
               AND ($2::text IS NULL OR LOWER(o.country) = LOWER($2)) \
             ORDER BY route_code"
        );
        sqlx::query_as::<_, Route>(&query)
            .bind(filter.airport_type.as_deref())
            .bind(filter.origin_country.as_deref())
            .fetch_all(&self.pool)
            .await
            .map_err(read_error)
    }
}
