//! Airline entity model and list filter.

use flighthours_core::types::DbId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `airlines` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Airline {
    pub id: DbId,
    pub airline_name: String,
    pub airline_code: String,
    /// Stored as text: `active` or `inactive`.
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AirlineStatus {
    Active,
    Inactive,
}

impl AirlineStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AirlineStatus::Active => "active",
            AirlineStatus::Inactive => "inactive",
        }
    }

    pub fn from_active(active: bool) -> Self {
        if active {
            AirlineStatus::Active
        } else {
            AirlineStatus::Inactive
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AirlineFilter {
    pub status: Option<AirlineStatus>,
}
