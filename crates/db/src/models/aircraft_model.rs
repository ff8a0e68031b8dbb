//! Aircraft model view and list filter.

use flighthours_core::types::DbId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An aircraft model joined with its engine type and manufacturer.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AircraftModel {
    pub id: DbId,
    pub model_name: String,
    pub aircraft_type_name: String,
    pub family: Option<String>,
    pub engine_type_id: DbId,
    pub engine_type_name: String,
    pub manufacturer_id: DbId,
    pub manufacturer_name: String,
    pub status: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AircraftModelFilter {
    pub engine_type_id: Option<DbId>,
    pub family: Option<String>,
}
