//! Repository for the `messages` table.
//!
//! Also the source the in-memory catalog loads from.

use async_trait::async_trait;
use flighthours_core::error::CoreError;
use flighthours_core::messages::{CatalogEntry, MessageSource, MessageType};
use flighthours_core::tx::Transaction;
use flighthours_core::types::DbId;

use crate::error::{classify, read_error};
use crate::models::message::{Message, MessageFields, MessageFilter};
use crate::tx::conn;
use crate::DbPool;

const COLUMNS: &str = "\
    id, code, type AS message_type, category, module, title, content, active, \
    created_at, updated_at";

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn list(&self, filter: &MessageFilter) -> Result<Vec<Message>, CoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<Message>, CoreError>;

    /// A reused code surfaces as `DuplicateMessageCode`.
    async fn insert(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        fields: &MessageFields,
    ) -> Result<Message, CoreError>;

    /// `None` when no row has `id`.
    async fn update(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        fields: &MessageFields,
    ) -> Result<Option<Message>, CoreError>;

    async fn delete(&self, tx: &mut dyn Transaction, id: DbId) -> Result<bool, CoreError>;
}

pub struct PgMessageRepo {
    pool: DbPool,
}

impl PgMessageRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepo {
    async fn list(&self, filter: &MessageFilter) -> Result<Vec<Message>, CoreError> {
        let query = format!(
            "SELECT {COLUMNS} FROM messages \
             WHERE ($1::text IS NULL OR type = UPPER($1)) \
               AND ($2::text IS NULL OR module = $2) \
               AND ($3::bool IS NULL OR active = $3) \
             ORDER BY code"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(filter.message_type.as_deref())
            .bind(filter.module.as_deref())
            .bind(filter.active)
            .fetch_all(&self.pool)
            .await
            .map_err(read_error)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Message>, CoreError> {
        let query = format!("SELECT {COLUMNS} FROM messages WHERE id = $1");
        sqlx::query_as::<_, Message>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error)
    }

    async fn insert(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        fields: &MessageFields,
    ) -> Result<Message, CoreError> {
        let query = format!(
            "INSERT INTO messages (id, code, type, category, module, title, content, active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(id)
            .bind(&fields.code)
            .bind(&fields.message_type)
            .bind(fields.category.as_deref())
            .bind(fields.module.as_deref())
            .bind(fields.title.as_deref())
            .bind(&fields.content)
            .bind(fields.active)
            .fetch_one(conn(tx)?)
            .await
            .map_err(|e| classify(e, CoreError::OperationFailed))
    }

    async fn update(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        fields: &MessageFields,
    ) -> Result<Option<Message>, CoreError> {
        let query = format!(
            "UPDATE messages SET \
                code = $2, type = $3, category = $4, module = $5, title = $6, \
                content = $7, active = $8, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(id)
            .bind(&fields.code)
            .bind(&fields.message_type)
            .bind(fields.category.as_deref())
            .bind(fields.module.as_deref())
            .bind(fields.title.as_deref())
            .bind(&fields.content)
            .bind(fields.active)
            .fetch_optional(conn(tx)?)
            .await
            .map_err(|e| classify(e, CoreError::OperationFailed))
    }

    async fn delete(&self, tx: &mut dyn Transaction, id: DbId) -> Result<bool, CoreError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(conn(tx)?)
            .await
            .map_err(|e| classify(e, CoreError::OperationFailed))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl MessageSource for PgMessageRepo {
    async fn active_messages(&self) -> Result<Vec<CatalogEntry>, CoreError> {
        let rows: Vec<(String, String, String)> =
            sqlx::query_as("SELECT code, type, content FROM messages WHERE active = TRUE")
                .fetch_all(&self.pool)
                .await
                .map_err(read_error)?;

        Ok(rows
            .into_iter()
            .map(|(code, kind, content)| CatalogEntry {
                code,
                // Types added by a newer schema load as INFO.
                message_type: kind.parse().unwrap_or(MessageType::Info),
                content,
            })
            .collect())
    }
}
