//! Airport entity model and list filter.

use flighthours_core::types::DbId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `airports` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Airport {
    pub id: DbId,
    pub name: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub iata_code: String,
    pub status: bool,
    pub airport_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AirportFilter {
    pub status: Option<bool>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub airport_type: Option<String>,
}
