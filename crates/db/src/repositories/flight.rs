//! Repository for the `daily_logbook_details` table (flight segments).

use async_trait::async_trait;
use flighthours_core::error::CoreError;
use flighthours_core::tx::Transaction;
use flighthours_core::types::DbId;

use crate::error::{classify, read_error};
use crate::models::flight::{Flight, FlightView};
use crate::tx::conn;
use crate::DbPool;

const COLUMNS: &str = "\
    id, daily_logbook_id, flight_real_date, flight_number, airline_route_id, \
    actual_aircraft_registration_id, passengers, out_time, takeoff_time, \
    landing_time, in_time, pilot_role, companion_name, air_time, block_time, \
    duty_time, approach_type, flight_type";

/// Segment columns plus the denormalized display fields, in one query.
const SELECT_VIEW: &str = "\
    SELECT f.id, f.daily_logbook_id, f.flight_real_date, f.flight_number, \
           f.airline_route_id, f.actual_aircraft_registration_id, f.passengers, \
           f.out_time, f.takeoff_time, f.landing_time, f.in_time, f.pilot_role, \
           f.companion_name, f.air_time, f.block_time, f.duty_time, \
           f.approach_type, f.flight_type, \
           dl.log_date, dl.employee_id AS owner_id, \
           reg.license_plate, am.model_name, a.airline_code, \
           o.iata_code AS origin_iata_code, dst.iata_code AS destination_iata_code, \
           CONCAT(o.iata_code, '-', dst.iata_code) AS route_code \
    FROM daily_logbook_details f \
    JOIN daily_logbooks dl ON dl.id = f.daily_logbook_id \
    JOIN aircraft_registrations reg ON reg.id = f.actual_aircraft_registration_id \
    JOIN aircraft_models am ON am.id = reg.aircraft_model_id \
    JOIN airline_routes ar ON ar.id = f.airline_route_id \
    JOIN airlines a ON a.id = ar.airline_id \
    JOIN routes r ON r.id = ar.route_id \
    JOIN airports o ON o.id = r.origin_airport_id \
    JOIN airports dst ON dst.id = r.destination_airport_id";

/// Segment persistence.
///
/// Writes classify foreign-key violations by constraint, so a missing
/// logbook, airline route or aircraft surfaces as `InvalidLogbook`,
/// `InvalidRoute` or `InvalidAircraft`. Anything else collapses into the
/// operation's own error code.
#[async_trait]
pub trait FlightRepository: Send + Sync {
    /// Segments of one logbook, ordered by out time.
    async fn list_by_logbook(&self, logbook_id: DbId) -> Result<Vec<FlightView>, CoreError>;

    async fn find_view(&self, id: DbId) -> Result<Option<FlightView>, CoreError>;

    /// Read a segment under a row lock.
    async fn lock(&self, tx: &mut dyn Transaction, id: DbId) -> Result<Option<Flight>, CoreError>;

    async fn insert(&self, tx: &mut dyn Transaction, flight: &Flight) -> Result<(), CoreError>;

    async fn update(&self, tx: &mut dyn Transaction, flight: &Flight) -> Result<(), CoreError>;

    async fn delete(&self, tx: &mut dyn Transaction, id: DbId) -> Result<bool, CoreError>;
}

pub struct PgFlightRepo {
    pool: DbPool,
}

impl PgFlightRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FlightRepository for PgFlightRepo {
    async fn list_by_logbook(&self, logbook_id: DbId) -> Result<Vec<FlightView>, CoreError> {
        let query = format!("{SELECT_VIEW} WHERE f.daily_logbook_id = $1 ORDER BY f.out_time ASC");
        sqlx::query_as::<_, FlightView>(&query)
            .bind(logbook_id)
            .fetch_all(&self.pool)
            .await
            .map_err(read_error)
    }

    async fn find_view(&self, id: DbId) -> Result<Option<FlightView>, CoreError> {
        let query = format!("{SELECT_VIEW} WHERE f.id = $1");
        sqlx::query_as::<_, FlightView>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error)
    }

    async fn lock(&self, tx: &mut dyn Transaction, id: DbId) -> Result<Option<Flight>, CoreError> {
        let query = format!("SELECT {COLUMNS} FROM daily_logbook_details WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Flight>(&query)
            .bind(id)
            .fetch_optional(conn(tx)?)
            .await
            .map_err(|e| classify(e, CoreError::FlightCannotUpdate))
    }

    async fn insert(&self, tx: &mut dyn Transaction, flight: &Flight) -> Result<(), CoreError> {
        sqlx::query(
            "INSERT INTO daily_logbook_details \
                (id, daily_logbook_id, flight_real_date, flight_number, airline_route_id, \
                 actual_aircraft_registration_id, passengers, out_time, takeoff_time, \
                 landing_time, in_time, pilot_role, companion_name, air_time, block_time, \
                 duty_time, approach_type, flight_type) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
        )
        .bind(flight.id)
        .bind(flight.daily_logbook_id)
        .bind(flight.flight_real_date)
        .bind(&flight.flight_number)
        .bind(flight.airline_route_id)
        .bind(flight.actual_aircraft_registration_id)
        .bind(flight.passengers)
        .bind(flight.out_time)
        .bind(flight.takeoff_time)
        .bind(flight.landing_time)
        .bind(flight.in_time)
        .bind(&flight.pilot_role)
        .bind(flight.companion_name.as_deref())
        .bind(flight.air_time)
        .bind(flight.block_time)
        .bind(flight.duty_time)
        .bind(flight.approach_type.as_deref())
        .bind(flight.flight_type.as_deref())
        .execute(conn(tx)?)
        .await
        .map_err(|e| classify(e, CoreError::FlightCannotSave))?;
        Ok(())
    }

    async fn update(&self, tx: &mut dyn Transaction, flight: &Flight) -> Result<(), CoreError> {
        sqlx::query(
            "UPDATE daily_logbook_details SET \
                flight_real_date = $2, flight_number = $3, airline_route_id = $4, \
                actual_aircraft_registration_id = $5, passengers = $6, out_time = $7, \
                takeoff_time = $8, landing_time = $9, in_time = $10, pilot_role = $11, \
                companion_name = $12, air_time = $13, block_time = $14, duty_time = $15, \
                approach_type = $16, flight_type = $17 \
             WHERE id = $1",
        )
        .bind(flight.id)
        .bind(flight.flight_real_date)
        .bind(&flight.flight_number)
        .bind(flight.airline_route_id)
        .bind(flight.actual_aircraft_registration_id)
        .bind(flight.passengers)
        .bind(flight.out_time)
        .bind(flight.takeoff_time)
        .bind(flight.landing_time)
        .bind(flight.in_time)
        .bind(&flight.pilot_role)
        .bind(flight.companion_name.as_deref())
        .bind(flight.air_time)
        .bind(flight.block_time)
        .bind(flight.duty_time)
        .bind(flight.approach_type.as_deref())
        .bind(flight.flight_type.as_deref())
        .execute(conn(tx)?)
        .await
        .map_err(|e| classify(e, CoreError::FlightCannotUpdate))?;
        Ok(())
    }

    async fn delete(&self, tx: &mut dyn Transaction, id: DbId) -> Result<bool, CoreError> {
        let result = sqlx::query("DELETE FROM daily_logbook_details WHERE id = $1")
            .bind(id)
            .execute(conn(tx)?)
            .await
            .map_err(|e| classify(e, CoreError::FlightCannotDelete))?;
        Ok(result.rows_affected() > 0)
    }
}
