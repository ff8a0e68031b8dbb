//! Shared harness for the API integration tests.
//!
//! Everything runs in memory: [`FakeDb`] stands in for the Postgres
//! repositories, [`FakeIdentity`] for Keycloak. Writes made through a
//! [`FakeTx`] are staged and only land in the tables on commit, so a
//! rolled-back write path leaves no rows behind. Foreign keys and unique
//! constraints report the same errors the Postgres repositories classify.

#![allow(dead_code)]

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use parking_lot::Mutex;
use serde_json::Value;
use tower::ServiceExt;

use flighthours_api::auth::jwt::{Claims, JwtConfig, RealmAccess};
use flighthours_api::config::ServerConfig;
use flighthours_api::router::build_app_router;
use flighthours_api::services::{
    AccountService, AircraftRegistrationService, AirlineEmployeeService, FlightService,
    LogbookService, MessageService, ProvisioningService, ReferenceService, Services,
};
use flighthours_api::state::AppState;
use flighthours_core::error::{CoreError, Entity, Reference};
use flighthours_core::id_codec::{IdCodec, IdCodecConfig, DEFAULT_MIN_LENGTH};
use flighthours_core::messages::{CatalogEntry, MessageCatalog, MessageSource, MessageType};
use flighthours_core::roles::ROLE_PILOT;
use flighthours_core::scope::{Budgets, Caller, RequestScope};
use flighthours_core::tx::{self, Transaction, TransactionManager};
use flighthours_core::types::{new_id, DbId};
use flighthours_db::models::aircraft_model::{AircraftModel, AircraftModelFilter};
use flighthours_db::models::aircraft_registration::{
    AircraftRegistration, AircraftRegistrationFilter, SaveAircraftRegistration,
};
use flighthours_db::models::airline::{Airline, AirlineFilter, AirlineStatus};
use flighthours_db::models::airport::{Airport, AirportFilter};
use flighthours_db::models::daily_logbook::{DailyLogbook, LogbookFields, LogbookFilter};
use flighthours_db::models::employee::{
    AirlineEmployeeChanges, AirlineEmployeeFilter, Employee, NewEmployee,
};
use flighthours_db::models::flight::{Flight, FlightView};
use flighthours_db::models::message::{Message, MessageFields, MessageFilter};
use flighthours_db::repositories::{
    AircraftRegistrationWriter, EmployeeRepository, FlightRepository, LogbookRepository,
    MessageRepository, ReferenceRepository, StatusRepository,
};
use flighthours_identity::{
    ActionTokenConfig, ActionTokenVerifier, ExternalUser, IdentityError, IdentityProvider,
    NewExternalUser, TokenSet,
};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";
pub const TEST_REALM_ISSUER: &str = "https://sso.test/realms/flighthours";
pub const TEST_ACTION_TOKEN_SECRET: &str = "test-realm-action-key";

/// Catalog content seeded into every harness.
pub const SEEDED_MESSAGES: &[(&str, &str, &str)] = &[
    ("UnknownRoute", "ERROR", "The requested route does not exist"),
    ("InvalidJSON", "ERROR", "The request body is not valid JSON"),
    ("InvalidID", "ERROR", "The identifier is not valid"),
    ("Unauthenticated", "ERROR", "Authentication is required"),
    ("Unauthorized", "ERROR", "The resource belongs to another employee"),
    ("Forbidden", "ERROR", "You do not have access to this resource"),
    ("ResourceCreated", "SUCCESS", "Resource created"),
    ("ResourceFound", "SUCCESS", "Resource found"),
    ("MessagesReloaded", "SUCCESS", "${0} messages loaded"),
    ("DailyLogbookNotFound", "ERROR", "Daily logbook not found"),
];

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

type StagedWrite = Box<dyn FnOnce(&FakeDb) + Send>;

/// A transaction handle holding writes until commit.
pub struct FakeTx {
    db: Arc<FakeDb>,
    staged: Vec<StagedWrite>,
}

#[async_trait]
impl Transaction for FakeTx {
    async fn commit(self: Box<Self>) -> Result<(), CoreError> {
        self.db.journal.lock().push("commit");
        if self.db.fail_commit.load(Ordering::SeqCst) {
            return Err(CoreError::DatabaseUnavailable("injected commit failure".into()));
        }
        let FakeTx { db, staged } = *self;
        for write in staged {
            write(&db);
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), CoreError> {
        self.db.journal.lock().push("rollback");
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut (dyn Any + Send) {
        self
    }
}

fn stage(
    tx: &mut dyn Transaction,
    write: impl FnOnce(&FakeDb) + Send + 'static,
) -> Result<(), CoreError> {
    tx::downcast::<FakeTx>(tx)?.staged.push(Box::new(write));
    Ok(())
}

pub struct FakeTxManager {
    db: Arc<FakeDb>,
}

#[async_trait]
impl TransactionManager for FakeTxManager {
    async fn begin(&self) -> Result<Box<dyn Transaction>, CoreError> {
        self.db.journal.lock().push("begin");
        Ok(Box::new(FakeTx {
            db: Arc::clone(&self.db),
            staged: Vec::new(),
        }))
    }

    async fn ping(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// In-memory stand-in for every writable table.
#[derive(Default)]
pub struct FakeDb {
    pub employees: Mutex<Vec<Employee>>,
    pub logbooks: Mutex<Vec<DailyLogbook>>,
    pub flights: Mutex<Vec<Flight>>,
    pub messages: Mutex<Vec<Message>>,
    pub registrations: Mutex<Vec<AircraftRegistration>>,
    pub airlines: Mutex<Vec<Airline>>,
    pub airports: Mutex<Vec<Airport>>,
    pub aircraft_models: Mutex<Vec<AircraftModel>>,
    /// `begin`, `commit` and `rollback`, in call order.
    pub journal: Mutex<Vec<&'static str>>,
    pub fail_commit: AtomicBool,
}

impl FakeDb {
    pub fn employee_by_email(&self, email: &str) -> Option<Employee> {
        self.employees.lock().iter().find(|e| e.email == email).cloned()
    }

    pub fn logbook(&self, id: DbId) -> Option<DailyLogbook> {
        self.logbooks.lock().iter().find(|l| l.id == id).cloned()
    }

    pub fn airline(&self, id: DbId) -> Option<Airline> {
        self.airlines.lock().iter().find(|a| a.id == id).cloned()
    }

    pub fn airport(&self, id: DbId) -> Option<Airport> {
        self.airports.lock().iter().find(|a| a.id == id).cloned()
    }

    pub fn aircraft_model(&self, id: DbId) -> Option<AircraftModel> {
        self.aircraft_models.lock().iter().find(|m| m.id == id).cloned()
    }

    pub fn registration(&self, id: DbId) -> Option<AircraftRegistration> {
        self.registrations.lock().iter().find(|r| r.id == id).cloned()
    }

    /// `fk_employees_airline`.
    fn check_airline(&self, airline_id: Option<DbId>) -> Result<(), CoreError> {
        match airline_id {
            Some(id) if self.airline(id).is_none() => {
                Err(CoreError::InvalidReference(Reference::Airline))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl EmployeeRepository for FakeDb {
    async fn find_by_id(&self, id: DbId) -> Result<Option<Employee>, CoreError> {
        Ok(self.employees.lock().iter().find(|e| e.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, CoreError> {
        Ok(self.employee_by_email(email))
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Employee>, CoreError> {
        Ok(self
            .employees
            .lock()
            .iter()
            .find(|e| e.keycloak_user_id.as_deref() == Some(external_id))
            .cloned())
    }

    async fn list_airline_employees(
        &self,
        filter: &AirlineEmployeeFilter,
    ) -> Result<Vec<Employee>, CoreError> {
        Ok(self
            .employees
            .lock()
            .iter()
            .filter(|e| e.airline_id.is_some())
            .filter(|e| filter.airline_id.is_none() || e.airline_id == filter.airline_id)
            .filter(|e| filter.active.map_or(true, |active| e.active == active))
            .cloned()
            .collect())
    }

    async fn insert(
        &self,
        tx: &mut dyn Transaction,
        employee: &NewEmployee,
    ) -> Result<Employee, CoreError> {
        if self.employee_by_email(&employee.email).is_some() {
            return Err(CoreError::DuplicateUser);
        }
        self.check_airline(employee.airline_id)?;
        let now = Utc::now();
        let row = Employee {
            id: employee.id,
            name: employee.name.clone(),
            airline_id: employee.airline_id,
            email: employee.email.clone(),
            identification_number: employee.identification_number.clone(),
            bp: employee.bp.clone(),
            start_date: employee.start_date,
            end_date: employee.end_date,
            active: employee.active,
            role: employee.role.clone(),
            keycloak_user_id: None,
            email_verified: false,
            created_at: now,
            updated_at: now,
        };
        let staged = row.clone();
        stage(tx, move |db| db.employees.lock().push(staged))?;
        Ok(row)
    }

    async fn link_external(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        external_id: &str,
    ) -> Result<(), CoreError> {
        let external_id = external_id.to_string();
        stage(tx, move |db| {
            if let Some(row) = db.employees.lock().iter_mut().find(|e| e.id == id) {
                row.keycloak_user_id = Some(external_id);
            }
        })
    }

    async fn lock(
        &self,
        _tx: &mut dyn Transaction,
        id: DbId,
    ) -> Result<Option<Employee>, CoreError> {
        EmployeeRepository::find_by_id(self, id).await
    }

    async fn update_airline_employee(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        changes: &AirlineEmployeeChanges,
    ) -> Result<Employee, CoreError> {
        let mut row = EmployeeRepository::find_by_id(self, id)
            .await?
            .ok_or(CoreError::NotFound(Entity::Employee))?;
        self.check_airline(Some(changes.airline_id))?;
        if self
            .employees
            .lock()
            .iter()
            .any(|e| e.email == changes.email && e.id != id)
        {
            return Err(CoreError::DuplicateUser);
        }
        row.name = changes.name.clone();
        row.airline_id = Some(changes.airline_id);
        row.email = changes.email.clone();
        row.identification_number = changes.identification_number.clone();
        row.bp = changes.bp.clone();
        row.start_date = Some(changes.start_date);
        row.end_date = changes.end_date;
        row.updated_at = Utc::now();
        let staged = row.clone();
        stage(tx, move |db| {
            if let Some(slot) = db.employees.lock().iter_mut().find(|e| e.id == id) {
                *slot = staged;
            }
        })?;
        Ok(row)
    }

    async fn set_active(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        active: bool,
    ) -> Result<(), CoreError> {
        stage(tx, move |db| {
            if let Some(row) = db.employees.lock().iter_mut().find(|e| e.id == id) {
                row.active = active;
            }
        })
    }

    async fn delete(&self, tx: &mut dyn Transaction, id: DbId) -> Result<bool, CoreError> {
        let exists = self.employees.lock().iter().any(|e| e.id == id);
        // ON DELETE CASCADE through logbooks to their segments.
        stage(tx, move |db| {
            db.employees.lock().retain(|e| e.id != id);
            let mut logbooks = db.logbooks.lock();
            let owned: Vec<DbId> = logbooks
                .iter()
                .filter(|l| l.employee_id == id)
                .map(|l| l.id)
                .collect();
            logbooks.retain(|l| l.employee_id != id);
            db.flights
                .lock()
                .retain(|f| !owned.contains(&f.daily_logbook_id));
        })?;
        Ok(exists)
    }

    async fn mark_email_verified(
        &self,
        tx: &mut dyn Transaction,
        email: &str,
    ) -> Result<bool, CoreError> {
        let exists = self.employee_by_email(email).is_some();
        let email = email.to_string();
        stage(tx, move |db| {
            if let Some(row) = db.employees.lock().iter_mut().find(|e| e.email == email) {
                row.email_verified = true;
            }
        })?;
        Ok(exists)
    }
}

#[async_trait]
impl LogbookRepository for FakeDb {
    async fn list_by_employee(
        &self,
        employee_id: DbId,
        filter: &LogbookFilter,
    ) -> Result<Vec<DailyLogbook>, CoreError> {
        Ok(self
            .logbooks
            .lock()
            .iter()
            .filter(|l| l.employee_id == employee_id)
            .filter(|l| filter.status.map_or(true, |status| l.status == status))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<DailyLogbook>, CoreError> {
        Ok(self.logbook(id))
    }

    async fn lock(
        &self,
        _tx: &mut dyn Transaction,
        id: DbId,
    ) -> Result<Option<DailyLogbook>, CoreError> {
        Ok(self.logbook(id))
    }

    async fn insert(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        employee_id: DbId,
        fields: &LogbookFields,
    ) -> Result<DailyLogbook, CoreError> {
        let now = Utc::now();
        let row = DailyLogbook {
            id,
            log_date: fields.log_date,
            employee_id,
            book_page: fields.book_page,
            status: fields.status,
            created_at: now,
            updated_at: now,
        };
        let staged = row.clone();
        stage(tx, move |db| db.logbooks.lock().push(staged))?;
        Ok(row)
    }

    async fn update(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        fields: &LogbookFields,
    ) -> Result<DailyLogbook, CoreError> {
        let mut row = self.logbook(id).ok_or(CoreError::NotFound(Entity::DailyLogbook))?;
        row.log_date = fields.log_date;
        row.book_page = fields.book_page;
        row.status = fields.status;
        let staged = row.clone();
        stage(tx, move |db| {
            if let Some(slot) = db.logbooks.lock().iter_mut().find(|l| l.id == id) {
                *slot = staged;
            }
        })?;
        Ok(row)
    }

    async fn set_status(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        active: bool,
    ) -> Result<(), CoreError> {
        stage(tx, move |db| {
            if let Some(row) = db.logbooks.lock().iter_mut().find(|l| l.id == id) {
                row.status = active;
            }
        })
    }

    async fn delete(&self, tx: &mut dyn Transaction, id: DbId) -> Result<bool, CoreError> {
        let exists = self.logbook(id).is_some();
        stage(tx, move |db| {
            db.logbooks.lock().retain(|l| l.id != id);
            db.flights.lock().retain(|f| f.daily_logbook_id != id);
        })?;
        Ok(exists)
    }
}

impl FakeDb {
    fn view(&self, flight: Flight) -> Option<FlightView> {
        let logbook = self.logbook(flight.daily_logbook_id)?;
        Some(FlightView {
            flight,
            log_date: logbook.log_date,
            owner_id: logbook.employee_id,
            license_plate: "HK-5000".into(),
            model_name: "A320".into(),
            airline_code: "AV".into(),
            origin_iata_code: "BOG".into(),
            destination_iata_code: "MDE".into(),
            route_code: "BOG-MDE".into(),
        })
    }
}

#[async_trait]
impl FlightRepository for FakeDb {
    async fn list_by_logbook(&self, logbook_id: DbId) -> Result<Vec<FlightView>, CoreError> {
        let mut flights: Vec<Flight> = self
            .flights
            .lock()
            .iter()
            .filter(|f| f.daily_logbook_id == logbook_id)
            .cloned()
            .collect();
        flights.sort_by_key(|f| f.out_time);
        Ok(flights.into_iter().filter_map(|f| self.view(f)).collect())
    }

    async fn find_view(&self, id: DbId) -> Result<Option<FlightView>, CoreError> {
        let flight = self.flights.lock().iter().find(|f| f.id == id).cloned();
        Ok(flight.and_then(|f| self.view(f)))
    }

    async fn lock(&self, _tx: &mut dyn Transaction, id: DbId) -> Result<Option<Flight>, CoreError> {
        Ok(self.flights.lock().iter().find(|f| f.id == id).cloned())
    }

    async fn insert(&self, tx: &mut dyn Transaction, flight: &Flight) -> Result<(), CoreError> {
        let staged = flight.clone();
        stage(tx, move |db| db.flights.lock().push(staged))
    }

    async fn update(&self, tx: &mut dyn Transaction, flight: &Flight) -> Result<(), CoreError> {
        let staged = flight.clone();
        stage(tx, move |db| {
            if let Some(slot) = db.flights.lock().iter_mut().find(|f| f.id == staged.id) {
                *slot = staged;
            }
        })
    }

    async fn delete(&self, tx: &mut dyn Transaction, id: DbId) -> Result<bool, CoreError> {
        let exists = self.flights.lock().iter().any(|f| f.id == id);
        stage(tx, move |db| db.flights.lock().retain(|f| f.id != id))?;
        Ok(exists)
    }
}

#[async_trait]
impl MessageRepository for FakeDb {
    async fn list(&self, filter: &MessageFilter) -> Result<Vec<Message>, CoreError> {
        Ok(self
            .messages
            .lock()
            .iter()
            .filter(|m| filter.message_type.as_ref().map_or(true, |t| &m.message_type == t))
            .filter(|m| filter.module.is_none() || m.module == filter.module)
            .filter(|m| filter.active.map_or(true, |active| m.active == active))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Message>, CoreError> {
        Ok(self.messages.lock().iter().find(|m| m.id == id).cloned())
    }

    async fn insert(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        fields: &MessageFields,
    ) -> Result<Message, CoreError> {
        if self.messages.lock().iter().any(|m| m.code == fields.code) {
            return Err(CoreError::DuplicateMessageCode);
        }
        let row = message_row(id, fields);
        let staged = row.clone();
        stage(tx, move |db| db.messages.lock().push(staged))?;
        Ok(row)
    }

    async fn update(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        fields: &MessageFields,
    ) -> Result<Option<Message>, CoreError> {
        if !self.messages.lock().iter().any(|m| m.id == id) {
            return Ok(None);
        }
        let row = message_row(id, fields);
        let staged = row.clone();
        stage(tx, move |db| {
            if let Some(slot) = db.messages.lock().iter_mut().find(|m| m.id == id) {
                *slot = staged;
            }
        })?;
        Ok(Some(row))
    }

    async fn delete(&self, tx: &mut dyn Transaction, id: DbId) -> Result<bool, CoreError> {
        let exists = self.messages.lock().iter().any(|m| m.id == id);
        stage(tx, move |db| db.messages.lock().retain(|m| m.id != id))?;
        Ok(exists)
    }
}

fn message_row(id: DbId, fields: &MessageFields) -> Message {
    let now = Utc::now();
    Message {
        id,
        code: fields.code.clone(),
        message_type: fields.message_type.clone(),
        category: fields.category.clone(),
        module: fields.module.clone(),
        title: fields.title.clone(),
        content: fields.content.clone(),
        active: fields.active,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl MessageSource for FakeDb {
    async fn active_messages(&self) -> Result<Vec<CatalogEntry>, CoreError> {
        Ok(self
            .messages
            .lock()
            .iter()
            .filter(|m| m.active)
            .map(|m| CatalogEntry {
                code: m.code.clone(),
                message_type: m.message_type.parse().unwrap_or(MessageType::Unknown),
                content: m.content.clone(),
            })
            .collect())
    }
}

#[async_trait]
impl ReferenceRepository<AircraftRegistration, AircraftRegistrationFilter> for FakeDb {
    async fn find_by_id(&self, id: DbId) -> Result<Option<AircraftRegistration>, CoreError> {
        Ok(self.registrations.lock().iter().find(|r| r.id == id).cloned())
    }

    async fn list(
        &self,
        filter: &AircraftRegistrationFilter,
    ) -> Result<Vec<AircraftRegistration>, CoreError> {
        Ok(self
            .registrations
            .lock()
            .iter()
            .filter(|r| filter.airline_id.map_or(true, |id| r.airline_id == id))
            .filter(|r| filter.aircraft_model_id.map_or(true, |id| r.aircraft_model_id == id))
            .cloned()
            .collect())
    }
}

impl FakeDb {
    /// `fk_aircraft_registrations_model` and `fk_aircraft_registrations_airline`,
    /// resolved to the names the joined read model carries.
    fn registration_names(
        &self,
        input: &SaveAircraftRegistration,
    ) -> Result<(String, String), CoreError> {
        let model = self
            .aircraft_model(input.aircraft_model_id)
            .ok_or(CoreError::InvalidReference(Reference::Model))?;
        let airline = self
            .airline(input.airline_id)
            .ok_or(CoreError::InvalidReference(Reference::Airline))?;
        Ok((model.model_name, airline.airline_name))
    }

    fn plate_taken(&self, plate: &str, except: Option<DbId>) -> bool {
        self.registrations
            .lock()
            .iter()
            .any(|r| r.license_plate == plate && Some(r.id) != except)
    }
}

#[async_trait]
impl AircraftRegistrationWriter for FakeDb {
    async fn insert(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        input: &SaveAircraftRegistration,
    ) -> Result<(), CoreError> {
        if self.plate_taken(&input.license_plate, None) {
            return Err(CoreError::DuplicateLicensePlate);
        }
        let (model_name, airline_name) = self.registration_names(input)?;
        let row = AircraftRegistration {
            id,
            license_plate: input.license_plate.clone(),
            aircraft_model_id: input.aircraft_model_id,
            model_name,
            airline_id: input.airline_id,
            airline_name,
        };
        stage(tx, move |db| db.registrations.lock().push(row))
    }

    async fn update(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        input: &SaveAircraftRegistration,
    ) -> Result<bool, CoreError> {
        if self.registration(id).is_none() {
            return Ok(false);
        }
        if self.plate_taken(&input.license_plate, Some(id)) {
            return Err(CoreError::DuplicateLicensePlate);
        }
        let (model_name, airline_name) = self.registration_names(input)?;
        let input = input.clone();
        stage(tx, move |db| {
            if let Some(row) = db.registrations.lock().iter_mut().find(|r| r.id == id) {
                row.license_plate = input.license_plate;
                row.aircraft_model_id = input.aircraft_model_id;
                row.model_name = model_name;
                row.airline_id = input.airline_id;
                row.airline_name = airline_name;
            }
        })?;
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Reference tables
// ---------------------------------------------------------------------------

fn same_text(column: Option<&str>, wanted: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => column.is_some_and(|value| value.eq_ignore_ascii_case(wanted)),
    }
}

#[async_trait]
impl ReferenceRepository<Airline, AirlineFilter> for FakeDb {
    async fn find_by_id(&self, id: DbId) -> Result<Option<Airline>, CoreError> {
        Ok(self.airline(id))
    }

    async fn list(&self, filter: &AirlineFilter) -> Result<Vec<Airline>, CoreError> {
        Ok(self
            .airlines
            .lock()
            .iter()
            .filter(|a| filter.status.map_or(true, |status| a.status == status.as_str()))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReferenceRepository<Airport, AirportFilter> for FakeDb {
    async fn find_by_id(&self, id: DbId) -> Result<Option<Airport>, CoreError> {
        Ok(self.airport(id))
    }

    async fn list(&self, filter: &AirportFilter) -> Result<Vec<Airport>, CoreError> {
        Ok(self
            .airports
            .lock()
            .iter()
            .filter(|a| filter.status.map_or(true, |status| a.status == status))
            .filter(|a| same_text(a.city.as_deref(), filter.city.as_deref()))
            .filter(|a| same_text(a.country.as_deref(), filter.country.as_deref()))
            .filter(|a| same_text(a.airport_type.as_deref(), filter.airport_type.as_deref()))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReferenceRepository<AircraftModel, AircraftModelFilter> for FakeDb {
    async fn find_by_id(&self, id: DbId) -> Result<Option<AircraftModel>, CoreError> {
        Ok(self.aircraft_model(id))
    }

    async fn list(&self, filter: &AircraftModelFilter) -> Result<Vec<AircraftModel>, CoreError> {
        Ok(self
            .aircraft_models
            .lock()
            .iter()
            .filter(|m| filter.engine_type_id.map_or(true, |id| m.engine_type_id == id))
            .filter(|m| same_text(m.family.as_deref(), filter.family.as_deref()))
            .cloned()
            .collect())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum StatusTable {
    Airlines,
    Airports,
    AircraftModels,
}

/// The activation flag of one in-memory reference table.
pub struct StatusColumn {
    db: Arc<FakeDb>,
    table: StatusTable,
}

impl StatusColumn {
    pub fn new(db: Arc<FakeDb>, table: StatusTable) -> Self {
        Self { db, table }
    }
}

#[async_trait]
impl StatusRepository for StatusColumn {
    async fn lock(&self, _tx: &mut dyn Transaction, id: DbId) -> Result<bool, CoreError> {
        Ok(match self.table {
            StatusTable::Airlines => self.db.airline(id).is_some(),
            StatusTable::Airports => self.db.airport(id).is_some(),
            StatusTable::AircraftModels => self.db.aircraft_model(id).is_some(),
        })
    }

    async fn set_status(
        &self,
        tx: &mut dyn Transaction,
        id: DbId,
        active: bool,
    ) -> Result<(), CoreError> {
        let table = self.table;
        stage(tx, move |db| match table {
            StatusTable::Airlines => {
                if let Some(row) = db.airlines.lock().iter_mut().find(|a| a.id == id) {
                    row.status = AirlineStatus::from_active(active).as_str().to_string();
                }
            }
            StatusTable::Airports => {
                if let Some(row) = db.airports.lock().iter_mut().find(|a| a.id == id) {
                    row.status = active;
                }
            }
            StatusTable::AircraftModels => {
                if let Some(row) = db.aircraft_models.lock().iter_mut().find(|m| m.id == id) {
                    row.status = active;
                }
            }
        })
    }
}

/// Empty reference table; reads find nothing and status changes miss.
pub struct EmptyTable;

#[async_trait]
impl<T, F> ReferenceRepository<T, F> for EmptyTable
where
    T: Send + 'static,
    F: Sync + 'static,
{
    async fn find_by_id(&self, _id: DbId) -> Result<Option<T>, CoreError> {
        Ok(None)
    }

    async fn list(&self, _filter: &F) -> Result<Vec<T>, CoreError> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl StatusRepository for EmptyTable {
    async fn lock(&self, _tx: &mut dyn Transaction, _id: DbId) -> Result<bool, CoreError> {
        Ok(false)
    }

    async fn set_status(
        &self,
        _tx: &mut dyn Transaction,
        _id: DbId,
        _active: bool,
    ) -> Result<(), CoreError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Identity provider
// ---------------------------------------------------------------------------

/// Identity-provider operations a test can make fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdpStep {
    Lookup,
    Create,
    SetPassword,
    AssignRole,
    Delete,
}

#[derive(Default)]
pub struct FakeIdentity {
    pub users: Mutex<Vec<ExternalUser>>,
    pub passwords: Mutex<Vec<(String, String, bool)>>,
    pub roles: Mutex<Vec<(String, String)>>,
    /// Every call as `operation:argument`, in order.
    pub calls: Mutex<Vec<String>>,
    pub failing: Mutex<Vec<IdpStep>>,
    /// Every call reports the provider as unreachable.
    pub unreachable: AtomicBool,
}

impl FakeIdentity {
    pub fn fail_on(&self, step: IdpStep) {
        self.failing.lock().push(step);
    }

    pub fn user(&self, email: &str) -> Option<ExternalUser> {
        self.users
            .lock()
            .iter()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned()
    }

    /// Add an account directly, as if created outside this service.
    pub fn seed_user(&self, email: &str, verified: bool) -> String {
        let id = format!("kc-{}", new_id());
        self.users.lock().push(ExternalUser {
            id: id.clone(),
            username: email.to_string(),
            email: Some(email.to_string()),
            email_verified: verified,
            enabled: true,
        });
        id
    }

    pub fn called(&self, operation: &str) -> bool {
        self.calls.lock().iter().any(|c| c.starts_with(operation))
    }

    fn record(&self, step: Option<IdpStep>, call: String) -> Result<(), IdentityError> {
        self.calls.lock().push(call);
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(IdentityError::Unreachable("connection refused".into()));
        }
        match step {
            Some(step) if self.failing.lock().contains(&step) => Err(IdentityError::Api {
                status: 500,
                body: format!("injected {step:?} failure"),
            }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn create_user(&self, user: &NewExternalUser) -> Result<String, IdentityError> {
        self.record(Some(IdpStep::Create), format!("create_user:{}", user.email))?;
        if self.user(&user.email).is_some() {
            return Err(IdentityError::Conflict(user.email.clone()));
        }
        let id = format!("kc-{}", new_id());
        self.users.lock().push(ExternalUser {
            id: id.clone(),
            username: user.username.clone(),
            email: Some(user.email.clone()),
            email_verified: false,
            enabled: true,
        });
        Ok(id)
    }

    async fn set_password(
        &self,
        user_id: &str,
        password: &str,
        temporary: bool,
    ) -> Result<(), IdentityError> {
        self.record(Some(IdpStep::SetPassword), format!("set_password:{user_id}"))?;
        let mut passwords = self.passwords.lock();
        passwords.retain(|(id, _, _)| id != user_id);
        passwords.push((user_id.to_string(), password.to_string(), temporary));
        Ok(())
    }

    async fn assign_role(&self, user_id: &str, role: &str) -> Result<(), IdentityError> {
        self.record(Some(IdpStep::AssignRole), format!("assign_role:{user_id}"))?;
        self.roles.lock().push((user_id.to_string(), role.to_string()));
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), IdentityError> {
        self.record(Some(IdpStep::Delete), format!("delete_user:{user_id}"))?;
        let mut users = self.users.lock();
        let before = users.len();
        users.retain(|u| u.id != user_id);
        if users.len() == before {
            return Err(IdentityError::NotFound(user_id.to_string()));
        }
        Ok(())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<ExternalUser, IdentityError> {
        self.record(Some(IdpStep::Lookup), format!("get_user_by_email:{email}"))?;
        self.user(email)
            .ok_or_else(|| IdentityError::NotFound(email.to_string()))
    }

    async fn send_verification_email(&self, email: &str) -> Result<(), IdentityError> {
        self.record(None, format!("send_verification_email:{email}"))
    }

    async fn mark_email_verified(&self, user_id: &str) -> Result<(), IdentityError> {
        self.record(None, format!("mark_email_verified:{user_id}"))?;
        if let Some(user) = self.users.lock().iter_mut().find(|u| u.id == user_id) {
            user.email_verified = true;
        }
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> Result<TokenSet, IdentityError> {
        self.record(None, format!("login:{username}"))?;
        let user = self.user(username).ok_or(IdentityError::BadCredentials)?;
        let matches = self
            .passwords
            .lock()
            .iter()
            .any(|(id, stored, _)| *id == user.id && stored == password);
        if !matches {
            return Err(IdentityError::BadCredentials);
        }
        Ok(TokenSet {
            access_token: format!("access-{}", user.id),
            refresh_token: Some(format!("refresh-{}", user.id)),
            expires_in: 300,
            refresh_expires_in: Some(1800),
            token_type: "Bearer".into(),
        })
    }
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        budgets: Budgets::default(),
        send_verification_email: true,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            issuer: None,
        },
    }
}

pub struct TestApp {
    pub db: Arc<FakeDb>,
    pub identity: Arc<FakeIdentity>,
    pub catalog: Arc<MessageCatalog>,
    pub state: AppState,
}

impl TestApp {
    /// Fresh in-memory stores with the seeded message catalog loaded.
    pub async fn new() -> Self {
        let db = Arc::new(FakeDb::default());
        for (code, message_type, content) in SEEDED_MESSAGES {
            db.messages.lock().push(message_row(
                new_id(),
                &MessageFields {
                    code: code.to_string(),
                    message_type: message_type.to_string(),
                    category: None,
                    module: None,
                    title: None,
                    content: content.to_string(),
                    active: true,
                },
            ));
        }

        let catalog = Arc::new(MessageCatalog::new());
        catalog
            .load(&*db)
            .await
            .expect("seeded catalog loads");

        let identity = Arc::new(FakeIdentity::default());
        let tx: Arc<dyn TransactionManager> = Arc::new(FakeTxManager { db: Arc::clone(&db) });
        let config = test_config();

        let action_tokens = ActionTokenVerifier::new(&ActionTokenConfig {
            secret: TEST_ACTION_TOKEN_SECRET.into(),
            algorithm: Algorithm::HS512,
            issuer: TEST_REALM_ISSUER.into(),
        });
        let status = |table| Arc::new(StatusColumn::new(Arc::clone(&db), table));

        let services = Services {
            airlines: ReferenceService::with_status(
                Entity::Airline,
                db.clone(),
                status(StatusTable::Airlines),
                tx.clone(),
            ),
            airports: ReferenceService::with_status(
                Entity::Airport,
                db.clone(),
                status(StatusTable::Airports),
                tx.clone(),
            ),
            routes: ReferenceService::read_only(Entity::Route, Arc::new(EmptyTable), tx.clone()),
            airline_routes: ReferenceService::with_status(
                Entity::AirlineRoute,
                Arc::new(EmptyTable),
                Arc::new(EmptyTable),
                tx.clone(),
            ),
            aircraft_models: ReferenceService::with_status(
                Entity::AircraftModel,
                db.clone(),
                status(StatusTable::AircraftModels),
                tx.clone(),
            ),
            engines: ReferenceService::read_only(Entity::Engine, Arc::new(EmptyTable), tx.clone()),
            manufacturers: ReferenceService::read_only(
                Entity::Manufacturer,
                Arc::new(EmptyTable),
                tx.clone(),
            ),
            registrations: AircraftRegistrationService::new(db.clone(), db.clone(), tx.clone()),
            logbooks: LogbookService::new(db.clone(), tx.clone()),
            flights: FlightService::new(db.clone(), db.clone(), tx.clone()),
            airline_employees: AirlineEmployeeService::new(db.clone(), tx.clone()),
            messages: MessageService::new(
                db.clone(),
                db.clone(),
                Arc::clone(&catalog),
                tx.clone(),
            ),
            accounts: AccountService::new(
                db.clone(),
                identity.clone(),
                tx.clone(),
                action_tokens,
            ),
            provisioning: ProvisioningService::new(db.clone(), identity.clone(), tx.clone(), true),
        };

        let codec = IdCodec::new(&IdCodecConfig {
            secret: "test-codec-secret".into(),
            min_length: DEFAULT_MIN_LENGTH,
        })
        .expect("valid codec config");

        let state = AppState {
            config: Arc::new(config),
            codec: Arc::new(codec),
            messages: Arc::clone(&catalog),
            services: Arc::new(services),
            tx,
        };

        Self {
            db,
            identity,
            catalog,
            state,
        }
    }

    /// The full application router with every middleware layer.
    pub fn router(&self) -> Router {
        build_app_router(self.state.clone(), &test_config())
    }

    pub fn services(&self) -> &Services {
        &self.state.services
    }

    pub fn encode(&self, id: DbId) -> String {
        self.state.codec.encode(id)
    }

    /// An employee present on both sides, ready to authenticate.
    pub fn seed_employee(&self, email: &str, role: &str) -> (Employee, String) {
        let external_id = self.identity.seed_user(email, true);
        let now = Utc::now();
        let employee = Employee {
            id: new_id(),
            name: "Test Pilot".into(),
            airline_id: None,
            email: email.to_string(),
            identification_number: "1000".into(),
            bp: None,
            start_date: None,
            end_date: None,
            active: true,
            role: role.to_string(),
            keycloak_user_id: Some(external_id.clone()),
            email_verified: true,
            created_at: now,
            updated_at: now,
        };
        self.db.employees.lock().push(employee.clone());
        let token = bearer_token(&external_id, email, &[role]);
        (employee, token)
    }

    /// A pilot with a bearer token.
    pub fn pilot(&self, email: &str) -> (Employee, String) {
        self.seed_employee(email, ROLE_PILOT)
    }

    /// A committed logbook owned by `employee_id`.
    pub fn seed_logbook(&self, employee_id: DbId) -> DailyLogbook {
        let now = Utc::now();
        let logbook = DailyLogbook {
            id: new_id(),
            log_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date"),
            employee_id,
            book_page: Some(12),
            status: true,
            created_at: now,
            updated_at: now,
        };
        self.db.logbooks.lock().push(logbook.clone());
        logbook
    }

    pub fn seed_airline(&self, code: &str, name: &str) -> Airline {
        let airline = Airline {
            id: new_id(),
            airline_name: name.to_string(),
            airline_code: code.to_string(),
            status: "active".into(),
        };
        self.db.airlines.lock().push(airline.clone());
        airline
    }

    pub fn seed_airport(
        &self,
        iata: &str,
        city: &str,
        country: &str,
        airport_type: &str,
    ) -> Airport {
        let airport = Airport {
            id: new_id(),
            name: format!("{city} International"),
            city: Some(city.to_string()),
            country: Some(country.to_string()),
            iata_code: iata.to_string(),
            status: true,
            airport_type: Some(airport_type.to_string()),
        };
        self.db.airports.lock().push(airport.clone());
        airport
    }

    pub fn seed_aircraft_model(&self, name: &str, family: &str) -> AircraftModel {
        let model = AircraftModel {
            id: new_id(),
            model_name: name.to_string(),
            aircraft_type_name: "Narrow-body".into(),
            family: Some(family.to_string()),
            engine_type_id: new_id(),
            engine_type_name: "Turbofan".into(),
            manufacturer_id: new_id(),
            manufacturer_name: "Airbus".into(),
            status: true,
        };
        self.db.aircraft_models.lock().push(model.clone());
        model
    }
}

/// A request scope for calling services directly.
pub fn scope() -> RequestScope {
    RequestScope::new(format!("test-{}", new_id()), Budgets::default())
}

/// A request scope acting as `employee`.
pub fn scope_as(employee: &Employee, roles: &[&str]) -> RequestScope {
    scope().with_caller(Caller {
        external_user_id: employee.keycloak_user_id.clone().unwrap_or_default(),
        email: Some(employee.email.clone()),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        employee_id: Some(employee.id),
    })
}

/// Sign an access token the way the identity provider would.
pub fn bearer_token(subject: &str, email: &str, roles: &[&str]) -> String {
    let claims = Claims {
        sub: subject.to_string(),
        email: Some(email.to_string()),
        realm_access: Some(RealmAccess {
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }),
        exp: (Utc::now() + chrono::Duration::hours(1)).timestamp(),
        iss: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("token encodes")
}

/// An action token addressed to `email`, signed with `key`.
pub fn action_token_signed_with(key: &str, email: &str) -> String {
    let exp = (Utc::now() + chrono::Duration::hours(1)).timestamp();
    encode(
        &Header::new(Algorithm::HS512),
        &serde_json::json!({
            "eml": email,
            "exp": exp,
            "iss": TEST_REALM_ISSUER,
            "aud": TEST_REALM_ISSUER,
            "typ": "verify-email",
        }),
        &EncodingKey::from_secret(key.as_bytes()),
    )
    .expect("token encodes")
}

/// An action token as the realm issues it.
pub fn action_token(email: &str) -> String {
    action_token_signed_with(TEST_ACTION_TOKEN_SECRET, email)
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Send a GET request without a token.
pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

/// Send a request, optionally with a bearer token and a JSON body.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

/// Send a raw body with a JSON content type.
pub async fn send_raw(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    raw: &str,
) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    app.oneshot(builder.body(Body::from(raw.to_string())).unwrap())
        .await
        .unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
