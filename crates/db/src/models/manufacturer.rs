//! Manufacturer model.

use flighthours_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `manufacturers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Manufacturer {
    pub id: DbId,
    pub name: String,
}
