//! Repository for the `daily_logbooks` table.

use async_trait::async_trait;
use flighthours_core::error::CoreError;
use flighthours_core::tx::Transaction;
use flighthours_core::types::DbId;

use super::set_flag;
use crate::error::{classify, read_error};
use crate::models::daily_logbook::{DailyLogbook, LogbookFields, LogbookFilter};
use crate::tx::conn;
use crate::DbPool;

const COLUMNS: &str = "id, log_date, employee_id, book_page, status, created_at, updated_at";

#[async_trait]
pub trait LogbookRepository: Send + Sync {
    async fn list_by_employee(
        &self,
        employee_id: DbId,
        filter: &LogbookFilter,
    ) -> Result<Vec<DailyLogbook>, CoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<DailyLogbook>, CoreError>;

    /// Read a logbook under a row lock, for ownership checks before a write.
    async fn lock(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
    ) -> Result<Option<DailyLogbook>, CoreError>;

    async fn insert(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        employee_id: DbId,
        fields: &LogbookFields,
    ) -> Result<DailyLogbook, CoreError>;

    async fn update(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        fields: &LogbookFields,
    ) -> Result<DailyLogbook, CoreError>;

    async fn set_status(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        active: bool,
    ) -> Result<(), CoreError>;

    async fn delete(&self, tx: &mut dyn Transaction, id: DbId) -> Result<bool, CoreError>;
}

pub struct PgLogbookRepo {
    pool: DbPool,
}

impl PgLogbookRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LogbookRepository for PgLogbookRepo {
    async fn list_by_employee(
        &self,
        employee_id: DbId,
        filter: &LogbookFilter,
    ) -> Result<Vec<DailyLogbook>, CoreError> {
        let query = format!(
            "SELECT {COLUMNS} FROM daily_logbooks \
             WHERE employee_id = $1 AND ($2::bool IS NULL OR status = $2) \
             ORDER BY log_date DESC"
        );
        sqlx::query_as::<_, DailyLogbook>(&query)
            .bind(employee_id)
            .bind(filter.status)
            .fetch_all(&self.pool)
            .await
            .map_err(read_error)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<DailyLogbook>, CoreError> {
        let query = format!("SELECT {COLUMNS} FROM daily_logbooks WHERE id = $1");
        sqlx::query_as::<_, DailyLogbook>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error)
    }

    async fn lock(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
    ) -> Result<Option<DailyLogbook>, CoreError> {
        let query = format!("SELECT {COLUMNS} FROM daily_logbooks WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, DailyLogbook>(&query)
            .bind(id)
            .fetch_optional(conn(tx)?)
            .await
            .map_err(|e| classify(e, CoreError::OperationFailed))
    }

    async fn insert(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        employee_id: DbId,
        fields: &LogbookFields,
    ) -> Result<DailyLogbook, CoreError> {
        let query = format!(
            "INSERT INTO daily_logbooks (id, log_date, employee_id, book_page, status) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DailyLogbook>(&query)
            .bind(id)
            .bind(fields.log_date)
            .bind(employee_id)
            .bind(fields.book_page)
            .bind(fields.status)
            .fetch_one(conn(tx)?)
            .await
            .map_err(|e| classify(e, CoreError::OperationFailed))
    }

    async fn update(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        fields: &LogbookFields,
    ) -> Result<DailyLogbook, CoreError> {
        let query = format!(
            "UPDATE daily_logbooks \
             SET log_date = $2, book_page = $3, status = $4, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DailyLogbook>(&query)
            .bind(id)
            .bind(fields.log_date)
            .bind(fields.book_page)
            .bind(fields.status)
            .fetch_one(conn(tx)?)
            .await
            .map_err(|e| classify(e, CoreError::OperationFailed))
    }

    async fn set_status(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        active: bool,
    ) -> Result<(), CoreError> {
        set_flag(tx, "daily_logbooks", id, active).await
    }

    /// Segments go with their logbook (`ON DELETE CASCADE`).
    async fn delete(&self, tx: &mut dyn Transaction, id: DbId) -> Result<bool, CoreError> {
        let result = sqlx::query("DELETE FROM daily_logbooks WHERE id = $1")
            .bind(id)
            .execute(conn(tx)?)
            .await
            .map_err(|e| classify(e, CoreError::OperationFailed))?;
        Ok(result.rows_affected() > 0)
    }
}
