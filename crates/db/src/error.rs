//! Classification of driver errors into domain errors.
//!
//! Connection-level failures become [`CoreError::DatabaseUnavailable`].
//! Foreign-key and unique violations are attributed by constraint name, so
//! the constraint names in the migrations are part of the contract. Anything
//! else falls back to the caller's operational error.

use flighthours_core::error::{CoreError, Reference};

/// Foreign-key constraint name to the reference it guards.
const FOREIGN_KEYS: &[(&str, Reference)] = &[
    ("fk_detail_daily_logbook", Reference::Logbook),
    ("fk_detail_airline_route", Reference::Route),
    ("fk_detail_aircraft_registration", Reference::Aircraft),
    ("fk_aircraft_registrations_model", Reference::Model),
    ("fk_aircraft_registrations_airline", Reference::Airline),
    ("fk_airline_routes_airline", Reference::Airline),
    ("fk_airline_routes_route", Reference::Route),
    ("fk_employees_airline", Reference::Airline),
    ("fk_routes_origin_airport", Reference::Airport),
    ("fk_routes_destination_airport", Reference::Airport),
    ("fk_aircraft_models_engine", Reference::Engine),
    ("fk_aircraft_models_manufacturer", Reference::Manufacturer),
    ("fk_daily_logbooks_employee", Reference::Employee),
];

/// Unique constraint name to the conflict it reports.
fn duplicate_for(constraint: &str) -> Option<CoreError> {
    match constraint {
        "uq_employees_email" => Some(CoreError::DuplicateUser),
        "uq_aircraft_registrations_license_plate" => Some(CoreError::DuplicateLicensePlate),
        "uq_messages_code" => Some(CoreError::DuplicateMessageCode),
        _ => None,
    }
}

pub fn reference_for(constraint: Option<&str>) -> Reference {
    let Some(name) = constraint else {
        return Reference::Unknown;
    };
    FOREIGN_KEYS
        .iter()
        .find(|(fk, _)| *fk == name)
        .map(|(_, reference)| *reference)
        .or_else(|| {
            // Constraint names from older schemas only mention the table.
            if name.contains("daily_logbook") {
                Some(Reference::Logbook)
            } else if name.contains("airline_route") {
                Some(Reference::Route)
            } else if name.contains("aircraft_registration") {
                Some(Reference::Aircraft)
            } else {
                None
            }
        })
        .unwrap_or(Reference::Unknown)
}

/// Classify `err`, using `fallback` for failures with no better meaning.
pub fn classify(err: sqlx::Error, fallback: fn(String) -> CoreError) -> CoreError {
    match &err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::WorkerCrashed => {
            tracing::error!(error = %err, "Database unreachable");
            CoreError::DatabaseUnavailable(err.to_string())
        }
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some("23503") => CoreError::InvalidReference(reference_for(db_err.constraint())),
            Some("23505") => db_err
                .constraint()
                .and_then(duplicate_for)
                .unwrap_or_else(|| fallback(err.to_string())),
            // Class 08 (connection exception) and admin shutdown.
            Some(code) if code.starts_with("08") || code == "57P01" => {
                tracing::error!(error = %err, "Database connection lost");
                CoreError::DatabaseUnavailable(err.to_string())
            }
            _ => {
                tracing::error!(error = %err, "Database error");
                fallback(err.to_string())
            }
        },
        _ => {
            tracing::error!(error = %err, "Database error");
            fallback(err.to_string())
        }
    }
}

/// Classification for read paths.
pub fn read_error(err: sqlx::Error) -> CoreError {
    classify(err, CoreError::ServerError)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn detail_foreign_keys_are_attributed() {
        assert_eq!(reference_for(Some("fk_detail_daily_logbook")), Reference::Logbook);
        assert_eq!(reference_for(Some("fk_detail_airline_route")), Reference::Route);
        assert_eq!(
            reference_for(Some("fk_detail_aircraft_registration")),
            Reference::Aircraft
        );
    }

    #[test]
    fn legacy_constraint_names_fall_back_to_table_names() {
        assert_eq!(reference_for(Some("employees_ibfk_2")), Reference::Unknown);
        assert_eq!(
            reference_for(Some("details_daily_logbook_id_fkey")),
            Reference::Logbook
        );
        assert_eq!(reference_for(None), Reference::Unknown);
    }

    #[test]
    fn pool_exhaustion_is_unavailability() {
        assert_matches!(
            classify(sqlx::Error::PoolTimedOut, CoreError::FlightCannotSave),
            CoreError::DatabaseUnavailable(_)
        );
    }

    #[test]
    fn other_failures_use_the_fallback() {
        assert_matches!(
            classify(sqlx::Error::RowNotFound, CoreError::FlightCannotUpdate),
            CoreError::FlightCannotUpdate(_)
        );
        assert_matches!(
            read_error(sqlx::Error::ColumnNotFound("x".into())),
            CoreError::ServerError(_)
        );
    }
}
