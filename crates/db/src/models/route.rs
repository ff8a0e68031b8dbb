//! Route view model and list filter.

use chrono::NaiveTime;
use flighthours_core::types::DbId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A route joined with both endpoint airports.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Route {
    pub id: DbId,
    pub origin_airport_id: DbId,
    pub origin_iata_code: String,
    pub origin_airport_name: String,
    pub origin_country: Option<String>,
    pub destination_airport_id: DbId,
    pub destination_iata_code: String,
    pub destination_airport_name: String,
    pub destination_country: Option<String>,
    pub airport_type: Option<String>,
    #[serde(serialize_with = "flighthours_core::flight_time::hms_opt::serialize")]
    pub estimated_flight_time: Option<NaiveTime>,
    /// `ORIGIN-DESTINATION` IATA pair.
    pub route_code: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteFilter {
    pub airport_type: Option<String>,
    pub origin_country: Option<String>,
}
