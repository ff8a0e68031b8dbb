//! Aircraft registration model, filter and write DTO.

use flighthours_core::types::DbId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registration joined with its model and operating airline.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AircraftRegistration {
    pub id: DbId,
    pub license_plate: String,
    pub aircraft_model_id: DbId,
    pub model_name: String,
    pub airline_id: DbId,
    pub airline_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AircraftRegistrationFilter {
    pub airline_id: Option<DbId>,
    pub aircraft_model_id: Option<DbId>,
}

/// DTO for creating or replacing a registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveAircraftRegistration {
    pub license_plate: String,
    pub aircraft_model_id: DbId,
    pub airline_id: DbId,
}
