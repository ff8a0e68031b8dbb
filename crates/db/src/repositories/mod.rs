//! Repository layer.
//!
//! Each repository is a struct holding the pool. Reads go straight to the
//! pool; writes take the caller's `&mut dyn Transaction` and never open or
//! close one themselves. The traits are the seams the services depend on,
//! so tests can substitute in-memory fakes.

mod aircraft_model;
mod aircraft_registration;
mod airline;
mod airline_route;
mod airport;
mod daily_logbook;
mod employee;
mod engine;
mod flight;
mod manufacturer;
mod message;
mod route;

pub use aircraft_model::PgAircraftModelRepo;
pub use aircraft_registration::{AircraftRegistrationWriter, PgAircraftRegistrationRepo};
pub use airline::PgAirlineRepo;
pub use airline_route::PgAirlineRouteRepo;
pub use airport::PgAirportRepo;
pub use daily_logbook::{LogbookRepository, PgLogbookRepo};
pub use employee::{EmployeeRepository, PgEmployeeRepo};
pub use engine::PgEngineRepo;
pub use flight::{FlightRepository, PgFlightRepo};
pub use manufacturer::PgManufacturerRepo;
pub use message::{MessageRepository, PgMessageRepo};
pub use route::PgRouteRepo;

use async_trait::async_trait;
use flighthours_core::error::CoreError;
use flighthours_core::tx::Transaction;
use flighthours_core::types::DbId;

use crate::error::classify;
use crate::tx::conn;

/// Get-by-id and filtered list over a denormalized read model.
#[async_trait]
pub trait ReferenceRepository<T, F>: Send + Sync
where
    T: Send + 'static,
    F: Sync + 'static,
{
    async fn find_by_id(&self, id: DbId) -> Result<Option<T>, CoreError>;

    async fn list(&self, filter: &F) -> Result<Vec<T>, CoreError>;
}

/// Activation flag on a status-bearing entity.
#[async_trait]
pub trait StatusRepository: Send + Sync {
    /// Lock the row for the rest of the transaction. `false` when absent.
    async fn lock(&self, tx: &mut dyn Transaction, id: DbId) -> Result<bool, CoreError>;

    async fn set_status(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        active: bool,
    ) -> Result<(), CoreError>;
}

// ---------------------------------------------------------------------------
// Shared statements
// ---------------------------------------------------------------------------

pub(crate) async fn lock_row(
    tx: &mut dyn Transaction,
    table: &str,
    id: DbId,
) -> Result<bool, CoreError> {
    let query = format!("SELECT id FROM {table} WHERE id = $1 FOR UPDATE");
    let row: Option<(DbId,)> = sqlx::query_as(&query)
        .bind(id)
        .fetch_optional(conn(tx)?)
        .await
        .map_err(|e| classify(e, CoreError::OperationFailed))?;
    Ok(row.is_some())
}

/// Set a boolean `status` column.
pub(crate) async fn set_flag(
    tx: &mut dyn Transaction,
    table: &str,
    id: DbId,
    active: bool,
) -> Result<(), CoreError> {
    let query = format!("UPDATE {table} SET status = $2 WHERE id = $1");
    sqlx::query(&query)
        .bind(id)
        .bind(active)
        .execute(conn(tx)?)
        .await
        .map_err(|e| classify(e, CoreError::OperationFailed))?;
    Ok(())
}
