//! Repository for the `aircraft_models` table.

use async_trait::async_trait;
use flighthours_core::error::CoreError;
use flighthours_core::tx::Transaction;
use flighthours_core::types::DbId;

use super::{lock_row, set_flag, ReferenceRepository, StatusRepository};
use crate::error::read_error;
use crate::models::aircraft_model::{AircraftModel, AircraftModelFilter};
use crate::DbPool;

const SELECT_VIEW: &str = "\
    SELECT am.id, am.model_name, am.aircraft_type_name, am.family, \
           am.engine_type_id, e.name AS engine_type_name, \
           am.manufacturer_id, m.name AS manufacturer_name, am.status \
    FROM aircraft_models am \
    JOIN engines e ON e.id = am.engine_type_id \
    JOIN manufacturers m ON m.id = am.manufacturer_id";

pub struct PgAircraftModelRepo {
    pool: DbPool,
}

impl PgAircraftModelRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferenceRepository<AircraftModel, AircraftModelFilter> for PgAircraftModelRepo {
    async fn find_by_id(&self, id: DbId) -> Result<Option<AircraftModel>, CoreError> {
        let query = format!("{SELECT_VIEW} WHERE am.id = $1");
        sqlx::query_as::<_, AircraftModel>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error)
    }

    async fn list(&self, filter: &AircraftModelFilter) -> Result<Vec<AircraftModel>, CoreError> {
        let query = format!(
            "{SELECT_VIEW} \
             WHERE ($1::uuid IS NULL OR am.engine_type_id = $1) \
               AND ($2::text IS NULL OR LOWER(am.family) = LOWER($2)) \
             ORDER BY am.model_name"
        );
        sqlx::query_as::<_, AircraftModel>(&query)
            .bind(filter.engine_type_id)
            .bind(filter.family.as_deref())
            .fetch_all(&self.pool)
            .await
            .map_err(read_error)
    }
}

#[async_trait]
impl StatusRepository for PgAircraftModelRepo {
    async fn lock(&self, tx: &mut dyn Transaction, id: DbId) -> Result<bool, CoreError> {
        lock_row(tx, "aircraft_models", id).await
    }

    async fn set_status(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        active: bool,
    ) -> Result<(), CoreError> {
        set_flag(tx, "aircraft_models", id, active).await
    }
}
