//! Repository for the `airports` table.

use async_trait::async_trait;
use flighthours_core::error::CoreError;
use flighthours_core::tx::Transaction;
use flighthours_core::types::DbId;

use super::{lock_row, set_flag, ReferenceRepository, StatusRepository};
use crate::error::read_error;
use crate::models::airport::{Airport, AirportFilter};
use crate::DbPool;

const COLUMNS: &str = "id, name, city, country, iata_code, status, airport_type";

pub struct PgAirportRepo {
    pool: DbPool,
}

impl PgAirportRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferenceRepository<Airport, AirportFilter> for PgAirportRepo {
    async fn find_by_id(&self, id: DbId) -> Result<Option<Airport>, CoreError> {
        let query = format!("SELECT {COLUMNS} FROM airports WHERE id = $1");
        sqlx::query_as::<_, Airport>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error)
    }

    /// City, country and type match case-insensitively.
    async fn list(&self, filter: &AirportFilter) -> Result<Vec<Airport>, CoreError> {
        let query = format!(
            "SELECT {COLUMNS} FROM airports \
             WHERE ($1::bool IS NULL OR status = $1) \
               AND ($2::text IS NULL OR LOWER(city) = LOWER($2)) \
               AND ($3::text IS NULL OR LOWER(country) = LOWER($3)) \
               AND ($4::text IS NULL OR LOWER(airport_type) = LOWER($4)) \
             ORDER BY name"
        );
        sqlx::query_as::<_, Airport>(&query)
            .bind(filter.status)
            .bind(filter.city.as_deref())
            .bind(filter.country.as_deref())
            .bind(filter.airport_type.as_deref())
            .fetch_all(&self.pool)
            .await
            .map_err(read_error)
    }
}

#[async_trait]
impl StatusRepository for PgAirportRepo {
    async fn lock(&self, tx: &mut dyn Transaction, id: DbId) -> Result<bool, CoreError> {
        lock_row(tx, "airports", id).await
    }

    async fn set_status(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        active: bool,
    ) -> Result<(), CoreError> {
        set_flag(tx, "airports", id, active).await
    }
}
