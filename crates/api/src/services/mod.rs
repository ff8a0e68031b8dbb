//! Write-path orchestration and owner-scoped reads.
//!
//! Services sit between handlers and repositories. They open and finish
//! transactions, apply validation and ownership rules, and run every
//! outbound call through the request scope's budgets.

pub mod accounts;
pub mod aircraft_registrations;
pub mod airline_employees;
pub mod flights;
pub mod logbooks;
pub mod messages;
pub mod provisioning;
pub mod reference;

use std::sync::Arc;

use flighthours_core::error::{CoreError, Entity};
use flighthours_core::messages::MessageCatalog;
use flighthours_core::tx::TransactionManager;
use flighthours_db::models::aircraft_model::{AircraftModel, AircraftModelFilter};
use flighthours_db::models::airline::{Airline, AirlineFilter};
use flighthours_db::models::airline_route::{AirlineRoute, AirlineRouteFilter};
use flighthours_db::models::airport::{Airport, AirportFilter};
use flighthours_db::models::engine::Engine;
use flighthours_db::models::manufacturer::Manufacturer;
use flighthours_db::models::route::{Route, RouteFilter};
use flighthours_db::models::NoFilter;
use flighthours_db::repositories::{
    PgAircraftModelRepo, PgAircraftRegistrationRepo, PgAirlineRepo, PgAirlineRouteRepo,
    PgAirportRepo, PgEmployeeRepo, PgEngineRepo, PgFlightRepo, PgLogbookRepo,
    PgManufacturerRepo, PgMessageRepo, PgRouteRepo,
};
use flighthours_db::DbPool;
use flighthours_identity::{ActionTokenVerifier, IdentityProvider};
use validator::ValidateEmail;

pub use accounts::AccountService;
pub use aircraft_registrations::AircraftRegistrationService;
pub use airline_employees::AirlineEmployeeService;
pub use flights::FlightService;
pub use logbooks::LogbookService;
pub use messages::MessageService;
pub use provisioning::ProvisioningService;
pub use reference::ReferenceService;

/// Every service the handlers reach through [`crate::state::AppState`].
pub struct Services {
    pub airlines: ReferenceService<Airline, AirlineFilter>,
    pub airports: ReferenceService<Airport, AirportFilter>,
    pub routes: ReferenceService<Route, RouteFilter>,
    pub airline_routes: ReferenceService<AirlineRoute, AirlineRouteFilter>,
    pub aircraft_models: ReferenceService<AircraftModel, AircraftModelFilter>,
    pub engines: ReferenceService<Engine, NoFilter>,
    pub manufacturers: ReferenceService<Manufacturer, NoFilter>,
    pub registrations: AircraftRegistrationService,
    pub logbooks: LogbookService,
    pub flights: FlightService,
    pub airline_employees: AirlineEmployeeService,
    pub messages: MessageService,
    pub accounts: AccountService,
    pub provisioning: ProvisioningService,
}

impl Services {
    /// Wire every service to the Postgres repositories.
    pub fn postgres(
        pool: &DbPool,
        tx: Arc<dyn TransactionManager>,
        identity: Arc<dyn IdentityProvider>,
        catalog: Arc<MessageCatalog>,
        action_tokens: ActionTokenVerifier,
        send_verification_email: bool,
    ) -> Self {
        let airlines = Arc::new(PgAirlineRepo::new(pool.clone()));
        let airports = Arc::new(PgAirportRepo::new(pool.clone()));
        let airline_routes = Arc::new(PgAirlineRouteRepo::new(pool.clone()));
        let aircraft_models = Arc::new(PgAircraftModelRepo::new(pool.clone()));
        let registrations = Arc::new(PgAircraftRegistrationRepo::new(pool.clone()));
        let employees = Arc::new(PgEmployeeRepo::new(pool.clone()));
        let logbooks = Arc::new(PgLogbookRepo::new(pool.clone()));
        let messages = Arc::new(PgMessageRepo::new(pool.clone()));

        Self {
            airlines: ReferenceService::with_status(
                Entity::Airline,
                airlines.clone(),
                airlines,
                tx.clone(),
            ),
            airports: ReferenceService::with_status(
                Entity::Airport,
                airports.clone(),
                airports,
                tx.clone(),
            ),
            routes: ReferenceService::read_only(
                Entity::Route,
                Arc::new(PgRouteRepo::new(pool.clone())),
                tx.clone(),
            ),
            airline_routes: ReferenceService::with_status(
                Entity::AirlineRoute,
                airline_routes.clone(),
                airline_routes,
                tx.clone(),
            ),
            aircraft_models: ReferenceService::with_status(
                Entity::AircraftModel,
                aircraft_models.clone(),
                aircraft_models,
                tx.clone(),
            ),
            engines: ReferenceService::read_only(
                Entity::Engine,
                Arc::new(PgEngineRepo::new(pool.clone())),
                tx.clone(),
            ),
            manufacturers: ReferenceService::read_only(
                Entity::Manufacturer,
                Arc::new(PgManufacturerRepo::new(pool.clone())),
                tx.clone(),
            ),
            registrations: AircraftRegistrationService::new(
                registrations.clone(),
                registrations,
                tx.clone(),
            ),
            logbooks: LogbookService::new(logbooks.clone(), tx.clone()),
            flights: FlightService::new(
                logbooks,
                Arc::new(PgFlightRepo::new(pool.clone())),
                tx.clone(),
            ),
            airline_employees: AirlineEmployeeService::new(employees.clone(), tx.clone()),
            messages: MessageService::new(messages.clone(), messages, catalog, tx.clone()),
            accounts: AccountService::new(
                employees.clone(),
                identity.clone(),
                tx.clone(),
                action_tokens,
            ),
            provisioning: ProvisioningService::new(
                employees,
                identity,
                tx,
                send_verification_email,
            ),
        }
    }
}

/// Emails are compared and stored lowercased.
pub fn normalize_email(raw: &str) -> Result<String, CoreError> {
    let email = raw.trim().to_lowercase();
    if !email.validate_email() {
        return Err(CoreError::InvalidRequest(format!("'{}' is not an email address", raw.trim())));
    }
    Ok(email)
}
