//! Repository for the `airline_routes` table.

use async_trait::async_trait;
use flighthours_core::error::CoreError;
use flighthours_core::tx::Transaction;
use flighthours_core::types::DbId;

use super::{lock_row, set_flag, ReferenceRepository, StatusRepository};
use crate::error::read_error;
use crate::models::airline_route::{AirlineRoute, AirlineRouteFilter};
use crate::DbPool;

const SELECT_VIEW: &str = "\
    SELECT ar.id, ar.route_id, ar.airline_id, ar.status, \
           a.airline_code, a.airline_name, \
           o.iata_code AS origin_iata_code, o.name AS origin_airport_name, \
           d.iata_code AS destination_iata_code, d.name AS destination_airport_name, \
           CONCAT(o.iata_code, '-', d.iata_code) AS route_code, \
           r.airport_type, r.estimated_flight_time \
    FROM airline_routes ar \
    JOIN airlines a ON a.id = ar.airline_id \
    JOIN routes r ON r.id = ar.route_id \
    JOIN airports o ON o.id = r.origin_airport_id \
    JOIN airports d ON d.id = r.destination_airport_id";

pub struct PgAirlineRouteRepo {
    pool: DbPool,
}

impl PgAirlineRouteRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferenceRepository<AirlineRoute, AirlineRouteFilter> for PgAirlineRouteRepo {
    async fn find_by_id(&self, id: DbId) -> Result<Option<AirlineRoute>, CoreError> {
        let query = format!("{SELECT_VIEW} WHERE ar.id = $1");
        sqlx::query_as::<_, AirlineRoute>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error)
    }

    async fn list(&self, filter: &AirlineRouteFilter) -> Result<Vec<AirlineRoute>, CoreError> {
        let query = format!(
            "{SELECT_VIEW} \
             WHERE ($1::uuid IS NULL OR ar.airline_id = $1) \
               AND ($2::text IS NULL OR a.airline_code = UPPER($2)) \
               AND ($3::bool IS NULL OR ar.status = $3) \
             ORDER BY a.airline_code, route_code"
        );
        sqlx::query_as::<_, AirlineRoute>(&query)
            .bind(filter.airline_id)
            .bind(filter.airline_code.as_deref())
            .bind(filter.status)
            .fetch_all(&self.pool)
            .await
            .map_err(read_error)
    }
}

#[async_trait]
impl StatusRepository for PgAirlineRouteRepo {
    async fn lock(&self, tx: &mut dyn Transaction, id: DbId) -> Result<bool, CoreError> {
        lock_row(tx, "airline_routes", id).await
    }

    async fn set_status(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        active: bool,
    ) -> Result<(), CoreError> {
        set_flag(tx, "airline_routes", id, active).await
    }
}
