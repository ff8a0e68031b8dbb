//! Logbook vocabulary: segment enumerations, date parsing, ownership.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Seat function flown on a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PilotRole {
    /// Pilot flying.
    #[serde(rename = "PF")]
    Pf,
    /// Pilot monitoring.
    #[serde(rename = "PM")]
    Pm,
    /// Pilot flying for the takeoff only.
    #[serde(rename = "PFTO")]
    Pfto,
    /// Pilot flying for the landing only.
    #[serde(rename = "PFL")]
    Pfl,
}

impl PilotRole {
    pub fn as_str(self) -> &'static str {
        match self {
            PilotRole::Pf => "PF",
            PilotRole::Pm => "PM",
            PilotRole::Pfto => "PFTO",
            PilotRole::Pfl => "PFL",
        }
    }
}

impl FromStr for PilotRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PF" => Ok(PilotRole::Pf),
            "PM" => Ok(PilotRole::Pm),
            "PFTO" => Ok(PilotRole::Pfto),
            "PFL" => Ok(PilotRole::Pfl),
            other => Err(CoreError::InvalidPilotRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApproachType {
    Npa,
    Pa,
    Apv,
    Visual,
}

impl ApproachType {
    pub fn as_str(self) -> &'static str {
        match self {
            ApproachType::Npa => "NPA",
            ApproachType::Pa => "PA",
            ApproachType::Apv => "APV",
            ApproachType::Visual => "VISUAL",
        }
    }
}

impl FromStr for ApproachType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NPA" => Ok(ApproachType::Npa),
            "PA" => Ok(ApproachType::Pa),
            "APV" => Ok(ApproachType::Apv),
            "VISUAL" => Ok(ApproachType::Visual),
            other => Err(CoreError::InvalidApproachType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlightType {
    Commercial,
    Training,
    Ferry,
    Check,
    Positioning,
}

impl FlightType {
    pub fn as_str(self) -> &'static str {
        match self {
            FlightType::Commercial => "COMMERCIAL",
            FlightType::Training => "TRAINING",
            FlightType::Ferry => "FERRY",
            FlightType::Check => "CHECK",
            FlightType::Positioning => "POSITIONING",
        }
    }
}

impl FromStr for FlightType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COMMERCIAL" => Ok(FlightType::Commercial),
            "TRAINING" => Ok(FlightType::Training),
            "FERRY" => Ok(FlightType::Ferry),
            "CHECK" => Ok(FlightType::Check),
            "POSITIONING" => Ok(FlightType::Positioning),
            other => Err(CoreError::InvalidFlightType(other.to_string())),
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(PilotRole, ApproachType, FlightType);

/// Parse an optional enumeration where both absence and `""` mean "not set".
pub fn parse_optional<T: FromStr<Err = CoreError>>(
    raw: Option<&str>,
) -> Result<Option<T>, CoreError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some),
    }
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Parse a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(raw: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| CoreError::InvalidDateFormat(raw.to_string()))
}

/// Employment window check: an open end is always valid.
pub fn check_date_range(start: NaiveDate, end: Option<NaiveDate>) -> Result<(), CoreError> {
    match end {
        Some(end) if start > end => Err(CoreError::StartDateAfterEndDate),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Ownership
// ---------------------------------------------------------------------------

/// A logbook (and every segment in it) belongs to exactly one employee.
pub fn ensure_owner(owner: DbId, caller: DbId) -> Result<(), CoreError> {
    if owner == caller {
        Ok(())
    } else {
        Err(CoreError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    // -- enumerations --

    #[test]
    fn pilot_roles_are_closed_world() {
        for (raw, role) in [
            ("PF", PilotRole::Pf),
            ("PM", PilotRole::Pm),
            ("PFTO", PilotRole::Pfto),
            ("PFL", PilotRole::Pfl),
        ] {
            assert_eq!(raw.parse::<PilotRole>().unwrap(), role);
            assert_eq!(role.as_str(), raw);
        }
        assert_matches!("pf".parse::<PilotRole>(), Err(CoreError::InvalidPilotRole(_)));
        assert_matches!("CAPTAIN".parse::<PilotRole>(), Err(CoreError::InvalidPilotRole(_)));
    }

    #[test]
    fn approach_type_may_be_absent() {
        assert_eq!(parse_optional::<ApproachType>(None).unwrap(), None);
        assert_eq!(parse_optional::<ApproachType>(Some("")).unwrap(), None);
        assert_eq!(
            parse_optional::<ApproachType>(Some("VISUAL")).unwrap(),
            Some(ApproachType::Visual)
        );
        assert_matches!(
            parse_optional::<ApproachType>(Some("ILS")),
            Err(CoreError::InvalidApproachType(_))
        );
    }

    #[test]
    fn flight_types_round_trip_through_text() {
        for ft in [
            FlightType::Commercial,
            FlightType::Training,
            FlightType::Ferry,
            FlightType::Check,
            FlightType::Positioning,
        ] {
            assert_eq!(ft.to_string().parse::<FlightType>().unwrap(), ft);
        }
        assert_matches!("CARGO".parse::<FlightType>(), Err(CoreError::InvalidFlightType(_)));
    }

    #[test]
    fn enumerations_serialize_as_wire_codes() {
        assert_eq!(serde_json::to_string(&PilotRole::Pfto).unwrap(), "\"PFTO\"");
        assert_eq!(serde_json::to_string(&ApproachType::Apv).unwrap(), "\"APV\"");
        assert_eq!(
            serde_json::to_string(&FlightType::Positioning).unwrap(),
            "\"POSITIONING\""
        );
    }

    // -- dates --

    #[test]
    fn dates_must_be_iso() {
        assert_eq!(
            parse_date("2024-03-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert_matches!(parse_date("01/03/2024"), Err(CoreError::InvalidDateFormat(_)));
        assert_matches!(parse_date("2024-02-30"), Err(CoreError::InvalidDateFormat(_)));
    }

    #[test]
    fn start_after_end_is_rejected() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let before = NaiveDate::from_ymd_opt(2024, 4, 30).unwrap();
        assert_matches!(
            check_date_range(start, Some(before)),
            Err(CoreError::StartDateAfterEndDate)
        );
        assert!(check_date_range(start, Some(start)).is_ok());
        assert!(check_date_range(start, None).is_ok());
    }

    // -- ownership --

    #[test]
    fn foreign_logbook_is_unauthorized() {
        let owner = crate::types::new_id();
        assert!(ensure_owner(owner, owner).is_ok());
        assert_matches!(
            ensure_owner(owner, crate::types::new_id()),
            Err(CoreError::Unauthorized)
        );
    }
}
