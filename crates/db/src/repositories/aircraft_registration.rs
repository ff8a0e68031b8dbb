//! Repository for the `aircraft_registrations` table.

use async_trait::async_trait;
use flighthours_core::error::CoreError;
use flighthours_core::tx::Transaction;
use flighthours_core::types::DbId;

use super::ReferenceRepository;
use crate::error::{classify, read_error};
use crate::models::aircraft_registration::{
    AircraftRegistration, AircraftRegistrationFilter, SaveAircraftRegistration,
};
use crate::tx::conn;
use crate::DbPool;

const SELECT_VIEW: &str = "\
    SELECT reg.id, reg.license_plate, \
           reg.aircraft_model_id, am.model_name, \
           reg.airline_id, a.airline_name \
    FROM aircraft_registrations reg \
    JOIN aircraft_models am ON am.id = reg.aircraft_model_id \
    JOIN airlines a ON a.id = reg.airline_id";

/// Write side of the registrations table.
///
/// Foreign-key violations surface as `InvalidModel` / `InvalidAirline` and a
/// reused plate as `DuplicateLicensePlate`.
#[async_trait]
pub trait AircraftRegistrationWriter: Send + Sync {
    async fn insert(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        input: &SaveAircraftRegistration,
    ) -> Result<(), CoreError>;

    /// Returns `false` when no row has `id`.
    async fn update(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        input: &SaveAircraftRegistration,
    ) -> Result<bool, CoreError>;
}

pub struct PgAircraftRegistrationRepo {
    pool: DbPool,
}

impl PgAircraftRegistrationRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferenceRepository<AircraftRegistration, AircraftRegistrationFilter>
    for PgAircraftRegistrationRepo
{
    async fn find_by_id(&self, id: DbId) -> Result<Option<AircraftRegistration>, CoreError> {
        let query = format!("{SELECT_VIEW} WHERE reg.id = $1");
        sqlx::query_as::<_, AircraftRegistration>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error)
    }

    async fn list(
        &self,
        filter: &AircraftRegistrationFilter,
    ) -> Result<Vec<AircraftRegistration>, CoreError> {
        let query = format!(
            "{SELECT_VIEW} \
             WHERE ($1::uuid IS NULL OR reg.airline_id = $1) \
               AND ($2::uuid IS NULL OR reg.aircraft_model_id = $2) \
             ORDER BY reg.license_plate"
        );
        sqlx::query_as::<_, AircraftRegistration>(&query)
            .bind(filter.airline_id)
            .bind(filter.aircraft_model_id)
            .fetch_all(&self.pool)
            .await
            .map_err(read_error)
    }
}

#[async_trait]
impl AircraftRegistrationWriter for PgAircraftRegistrationRepo {
    async fn insert(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        input: &SaveAircraftRegistration,
    ) -> Result<(), CoreError> {
        sqlx::query(
            "INSERT INTO aircraft_registrations (id, license_plate, aircraft_model_id, airline_id) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(&input.license_plate)
        .bind(input.aircraft_model_id)
        .bind(input.airline_id)
        .execute(conn(tx)?)
        .await
        .map_err(|e| classify(e, CoreError::OperationFailed))?;
        Ok(())
    }

    async fn update(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        input: &SaveAircraftRegistration,
    ) -> Result<bool, CoreError> {
        let result = sqlx::query(
            "UPDATE aircraft_registrations \
             SET license_plate = $2, aircraft_model_id = $3, airline_id = $4 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.license_plate)
        .bind(input.aircraft_model_id)
        .bind(input.airline_id)
        .execute(conn(tx)?)
        .await
        .map_err(|e| classify(e, CoreError::OperationFailed))?;
        Ok(result.rows_affected() > 0)
    }
}
