//! Repository for the `airlines` table.

use async_trait::async_trait;
use flighthours_core::error::CoreError;
use flighthours_core::tx::Transaction;
use flighthours_core::types::DbId;

use super::{lock_row, ReferenceRepository, StatusRepository};
use crate::error::{classify, read_error};
use crate::models::airline::{Airline, AirlineFilter, AirlineStatus};
use crate::tx::conn;
use crate::DbPool;

const COLUMNS: &str = "id, airline_name, airline_code, status";

pub struct PgAirlineRepo {
    pool: DbPool,
}

impl PgAirlineRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferenceRepository<Airline, AirlineFilter> for PgAirlineRepo {
    async fn find_by_id(&self, id: DbId) -> Result<Option<Airline>, CoreError> {
        let query = format!("SELECT {COLUMNS} FROM airlines WHERE id = $1");
        sqlx::query_as::<_, Airline>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error)
    }

    async fn list(&self, filter: &AirlineFilter) -> Result<Vec<Airline>, CoreError> {
        let query = format!(
            "SELECT {COLUMNS} FROM airlines \
             WHERE ($1::text IS NULL OR status = $1) \
             ORDER BY airline_name"
        );
        sqlx::query_as::<_, Airline>(&query)
            .bind(filter.status.map(AirlineStatus::as_str))
            .fetch_all(&self.pool)
            .await
            .map_err(read_error)
    }
}

#[async_trait]
impl StatusRepository for PgAirlineRepo {
    async fn lock(&self, tx: &mut dyn Transaction, id: DbId) -> Result<bool, CoreError> {
        lock_row(tx, "airlines", id).await
    }

    /// Airline status is stored as text, unlike the boolean flags elsewhere.
    async fn set_status(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        active: bool,
    ) -> Result<(), CoreError> {
        sqlx::query("UPDATE airlines SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(AirlineStatus::from_active(active).as_str())
            .execute(conn(tx)?)
            .await
            .map_err(|e| classify(e, CoreError::OperationFailed))?;
        Ok(())
    }
}
