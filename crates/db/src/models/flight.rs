//! Flight segment (logbook detail) model and DTOs.
//!
//! Clock fields travel as text on the wire and as `TIME` in the database.
//! Air time and block time are derived from the four segment clocks on every
//! write, never taken from the request.

use chrono::{NaiveDate, NaiveTime};
use flighthours_core::flight_time::{clock, clock_opt};
use flighthours_core::types::DbId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `daily_logbook_details` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Flight {
    pub id: DbId,
    pub daily_logbook_id: DbId,
    pub flight_real_date: NaiveDate,
    pub flight_number: String,
    pub airline_route_id: DbId,
    pub actual_aircraft_registration_id: DbId,
    pub passengers: Option<i32>,
    #[serde(with = "clock")]
    pub out_time: NaiveTime,
    #[serde(with = "clock")]
    pub takeoff_time: NaiveTime,
    #[serde(with = "clock")]
    pub landing_time: NaiveTime,
    #[serde(with = "clock")]
    pub in_time: NaiveTime,
    pub pilot_role: String,
    pub companion_name: Option<String>,
    #[serde(with = "clock")]
    pub air_time: NaiveTime,
    #[serde(with = "clock")]
    pub block_time: NaiveTime,
    #[serde(with = "clock_opt")]
    pub duty_time: Option<NaiveTime>,
    pub approach_type: Option<String>,
    pub flight_type: Option<String>,
}

/// A segment joined with its logbook, aircraft and route for display.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FlightView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub flight: Flight,
    pub log_date: NaiveDate,
    /// Owner of the parent logbook.
    #[serde(skip_serializing)]
    pub owner_id: DbId,
    pub license_plate: String,
    pub model_name: String,
    pub airline_code: String,
    pub origin_iata_code: String,
    pub destination_iata_code: String,
    pub route_code: String,
}

/// Create/replace body for a segment.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveFlight {
    pub flight_real_date: String,
    pub flight_number: String,
    pub airline_route_id: DbId,
    pub actual_aircraft_registration_id: DbId,
    pub passengers: Option<i32>,
    pub out_time: String,
    pub takeoff_time: String,
    pub landing_time: String,
    pub in_time: String,
    pub pilot_role: String,
    pub companion_name: Option<String>,
    pub duty_time: Option<String>,
    pub approach_type: Option<String>,
    pub flight_type: Option<String>,
    /// Accepted for compatibility; recomputed server-side.
    pub air_time: Option<String>,
    /// Accepted for compatibility; recomputed server-side.
    pub block_time: Option<String>,
}
