//! Repository for the `manufacturers` table.

use async_trait::async_trait;
use flighthours_core::error::CoreError;
use flighthours_core::types::DbId;

use super::ReferenceRepository;
use crate::error::read_error;
use crate::models::manufacturer::Manufacturer;
use crate::models::NoFilter;
use crate::DbPool;

const COLUMNS: &str = "id, name";

pub struct PgManufacturerRepo {
    pool: DbPool,
}

impl PgManufacturerRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferenceRepository<Manufacturer, NoFilter> for PgManufacturerRepo {
    async fn find_by_id(&self, id: DbId) -> Result<Option<Manufacturer>, CoreError> {
        let query = format!("SELECT {COLUMNS} FROM manufacturers WHERE id = $1");
        sqlx::query_as::<_, Manufacturer>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error)
    }

    async fn list(&self, _filter: &NoFilter) -> Result<Vec<Manufacturer>, CoreError> {
        let query = format!("SELECT {COLUMNS} FROM manufacturers ORDER BY name");
        sqlx::query_as::<_, Manufacturer>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(read_error)
    }
}
