//! Employee entity model and DTOs.
//!
//! An employee is the local mirror of an identity-provider account. Pilots
//! registered through the API carry no airline; airline employees are
//! managed by administrators and are never linked to an external account.

use chrono::NaiveDate;
use flighthours_core::provisioning::LocalRecord;
use flighthours_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `employees` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Employee {
    pub id: DbId,
    pub name: String,
    pub airline_id: Option<DbId>,
    pub email: String,
    pub identification_number: String,
    pub bp: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub active: bool,
    pub role: String,
    #[serde(skip_serializing)]
    pub keycloak_user_id: Option<String>,
    pub email_verified: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Employee {
    /// Airline staff rows are local-only; registered pilots carry no airline.
    pub fn origin(&self) -> LocalRecord {
        if self.airline_id.is_some() {
            LocalRecord::Staff
        } else {
            LocalRecord::Registered
        }
    }
}

/// Insert payload, built by the service after validation.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub id: DbId,
    pub name: String,
    pub airline_id: Option<DbId>,
    pub email: String,
    pub identification_number: String,
    pub bp: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub active: bool,
    pub role: String,
}

/// Registration request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterEmployee {
    pub name: String,
    pub email: String,
    pub password: String,
    pub identification_number: String,
    pub role: String,
    pub bp: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Airline employee create/replace body. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveAirlineEmployee {
    pub name: String,
    pub airline_id: DbId,
    pub email: String,
    pub identification_number: String,
    pub bp: Option<String>,
    pub start_date: String,
    pub end_date: Option<String>,
    pub active: Option<bool>,
}

/// Validated airline employee fields, applied on update.
#[derive(Debug, Clone)]
pub struct AirlineEmployeeChanges {
    pub name: String,
    pub airline_id: DbId,
    pub email: String,
    pub identification_number: String,
    pub bp: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AirlineEmployeeFilter {
    pub airline_id: Option<DbId>,
    pub active: Option<bool>,
}
