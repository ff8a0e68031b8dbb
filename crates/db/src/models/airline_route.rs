//! Airline-route view model and list filter.

use chrono::NaiveTime;
use flighthours_core::types::DbId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An airline's operation of a route, joined with airline and airports.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AirlineRoute {
    pub id: DbId,
    pub route_id: DbId,
    pub airline_id: DbId,
    pub status: bool,
    pub airline_code: String,
    pub airline_name: String,
    pub origin_iata_code: String,
    pub origin_airport_name: String,
    pub destination_iata_code: String,
    pub destination_airport_name: String,
    pub route_code: String,
    pub airport_type: Option<String>,
    #[serde(serialize_with = "flighthours_core::flight_time::hms_opt::serialize")]
    pub estimated_flight_time: Option<NaiveTime>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AirlineRouteFilter {
    pub airline_id: Option<DbId>,
    pub airline_code: Option<String>,
    pub status: Option<bool>,
}
