//! Engine type model.

use flighthours_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `engines` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Engine {
    pub id: DbId,
    pub name: String,
}
