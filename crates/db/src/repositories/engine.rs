//! Repository for the `engines` table.

use async_trait::async_trait;
use flighthours_core::error::CoreError;
use flighthours_core::types::DbId;

use super::ReferenceRepository;
use crate::error::read_error;
use crate::models::engine::Engine;
use crate::models::NoFilter;
use crate::DbPool;

const COLUMNS: &str = "id, name";

pub struct PgEngineRepo {
    pool: DbPool,
}

impl PgEngineRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferenceRepository<Engine, NoFilter> for PgEngineRepo {
    async fn find_by_id(&self, id: DbId) -> Result<Option<Engine>, CoreError> {
        let query = format!("SELECT {COLUMNS} FROM engines WHERE id = $1");
        sqlx::query_as::<_, Engine>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error)
    }

    async fn list(&self, _filter: &NoFilter) -> Result<Vec<Engine>, CoreError> {
        let query = format!("SELECT {COLUMNS} FROM engines ORDER BY name");
        sqlx::query_as::<_, Engine>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(read_error)
    }
}
