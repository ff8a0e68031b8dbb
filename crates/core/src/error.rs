//! Domain error taxonomy.
//!
//! Every error is a plain value carrying a machine-readable code. Rendering a
//! code into user-facing text happens only at the response boundary, through
//! the message catalog ([`crate::messages::MessageCatalog`]), so the codes
//! returned by [`CoreError::code`] double as catalog keys.

use std::fmt;

/// Coarse grouping used to pick an HTTP status at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Client,
    Auth,
    NotFound,
    Conflict,
    Dependency,
    Server,
}

/// Entities that can be reported as missing.
///
/// `City`, `Country`, `AirportType` and `AircraftFamily` are virtual
/// entities: a read that groups airports or models by that attribute and
/// finds nothing reports the attribute value itself as unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Airline,
    Airport,
    Route,
    AirlineRoute,
    AircraftModel,
    Engine,
    Manufacturer,
    AircraftRegistration,
    Employee,
    DailyLogbook,
    Flight,
    Message,
    City,
    Country,
    AirportType,
    AircraftFamily,
    User,
}

impl Entity {
    pub fn name(self) -> &'static str {
        match self {
            Entity::Airline => "Airline",
            Entity::Airport => "Airport",
            Entity::Route => "Route",
            Entity::AirlineRoute => "AirlineRoute",
            Entity::AircraftModel => "AircraftModel",
            Entity::Engine => "Engine",
            Entity::Manufacturer => "Manufacturer",
            Entity::AircraftRegistration => "AircraftRegistration",
            Entity::Employee => "Employee",
            Entity::DailyLogbook => "DailyLogbook",
            Entity::Flight => "Flight",
            Entity::Message => "Message",
            Entity::City => "City",
            Entity::Country => "Country",
            Entity::AirportType => "AirportType",
            Entity::AircraftFamily => "AircraftFamily",
            Entity::User => "User",
        }
    }

    /// The `<Entity>NotFound` code reported for this entity.
    pub fn not_found_code(self) -> &'static str {
        match self {
            Entity::Airline => "AirlineNotFound",
            Entity::Airport => "AirportNotFound",
            Entity::Route => "RouteNotFound",
            Entity::AirlineRoute => "AirlineRouteNotFound",
            Entity::AircraftModel => "AircraftModelNotFound",
            Entity::Engine => "EngineNotFound",
            Entity::Manufacturer => "ManufacturerNotFound",
            Entity::AircraftRegistration => "AircraftRegistrationNotFound",
            Entity::Employee => "EmployeeNotFound",
            Entity::DailyLogbook => "DailyLogbookNotFound",
            Entity::Flight => "FlightNotFound",
            Entity::Message => "MessageNotFound",
            Entity::City => "CityNotFound",
            Entity::Country => "CountryNotFound",
            Entity::AirportType => "AirportTypeNotFound",
            Entity::AircraftFamily => "AircraftFamilyNotFound",
            Entity::User => "UserNotFound",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The side of a foreign key that failed to resolve on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    Logbook,
    Route,
    Aircraft,
    Airline,
    Model,
    Engine,
    Manufacturer,
    Airport,
    Employee,
    /// A foreign key whose constraint could not be attributed.
    Unknown,
}

impl Reference {
    pub fn code(self) -> &'static str {
        match self {
            Reference::Logbook => "InvalidLogbook",
            Reference::Route => "InvalidRoute",
            Reference::Aircraft => "InvalidAircraft",
            Reference::Airline => "InvalidAirline",
            Reference::Model => "InvalidModel",
            Reference::Engine => "InvalidEngine",
            Reference::Manufacturer => "InvalidManufacturer",
            Reference::Airport => "InvalidAirport",
            Reference::Employee => "InvalidEmployee",
            Reference::Unknown => "InvalidForeignKey",
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CoreError {
    // --- client ---
    #[error("Malformed JSON body: {0}")]
    InvalidJson(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid identifier")]
    InvalidId,

    #[error("Invalid date format: {0}")]
    InvalidDateFormat(String),

    #[error("Start date is after end date")]
    StartDateAfterEndDate,

    #[error("Invalid time sequence")]
    InvalidTimeSequence,

    #[error("Invalid pilot role: {0}")]
    InvalidPilotRole(String),

    #[error("Invalid approach type: {0}")]
    InvalidApproachType(String),

    #[error("Invalid flight type: {0}")]
    InvalidFlightType(String),

    #[error("Role is required")]
    RoleRequired,

    #[error("Invalid or expired action token")]
    InvalidToken,

    #[error("Message code is required")]
    MessageCodeRequired,

    #[error("Invalid message type: {0}")]
    InvalidMessageType(String),

    #[error("Foreign key did not resolve: {0}")]
    InvalidReference(Reference),

    // --- auth ---
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Bad credentials")]
    BadCredentials,

    #[error("Resource is owned by another employee")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // --- not found ---
    #[error("{0} not found")]
    NotFound(Entity),

    #[error("No route matches the request")]
    UnknownRoute,

    // --- conflict ---
    #[error("User already exists")]
    DuplicateUser,

    #[error("License plate already registered")]
    DuplicateLicensePlate,

    #[error("Message code already exists")]
    DuplicateMessageCode,

    #[error("Registration is incomplete and must be reconciled")]
    IncompleteRegistration,

    #[error("Email already verified")]
    EmailAlreadyVerified,

    // --- dependency ---
    #[error("Database unavailable: {0}")]
    DatabaseUnavailable(String),

    #[error("Identity provider unavailable: {0}")]
    IdentityProviderUnavailable(String),

    #[error("External user creation failed: {0}")]
    ExternalUserCreationFailed(String),

    #[error("Message catalog load failed: {0}")]
    MessageCatalogLoadFailed(String),

    // --- server ---
    #[error("Transaction begin failed: {0}")]
    TransactionBeginFailed(String),

    #[error("Transaction commit failed: {0}")]
    TransactionCommitFailed(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("User cannot be saved: {0}")]
    UserCannotSave(String),

    #[error("Flight cannot be saved: {0}")]
    FlightCannotSave(String),

    #[error("Flight cannot be updated: {0}")]
    FlightCannotUpdate(String),

    #[error("Flight cannot be deleted: {0}")]
    FlightCannotDelete(String),

    #[error("Request cancelled")]
    RequestCancelled,

    #[error("Server error: {0}")]
    ServerError(String),
}

impl CoreError {
    /// Machine-readable code, also the message catalog key.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::InvalidJson(_) => "InvalidJSON",
            CoreError::InvalidRequest(_) => "InvalidRequest",
            CoreError::InvalidId => "InvalidID",
            CoreError::InvalidDateFormat(_) => "InvalidDateFormat",
            CoreError::StartDateAfterEndDate => "StartDateAfterEndDate",
            CoreError::InvalidTimeSequence => "InvalidTimeSequence",
            CoreError::InvalidPilotRole(_) => "InvalidPilotRole",
            CoreError::InvalidApproachType(_) => "InvalidApproachType",
            CoreError::InvalidFlightType(_) => "InvalidFlightType",
            CoreError::RoleRequired => "RoleRequired",
            CoreError::InvalidToken => "InvalidToken",
            CoreError::MessageCodeRequired => "MessageCodeRequired",
            CoreError::InvalidMessageType(_) => "InvalidMessageType",
            CoreError::InvalidReference(reference) => reference.code(),
            CoreError::Unauthenticated(_) => "Unauthenticated",
            CoreError::BadCredentials => "BadCredentials",
            CoreError::Unauthorized => "Unauthorized",
            CoreError::Forbidden(_) => "Forbidden",
            CoreError::NotFound(entity) => entity.not_found_code(),
            CoreError::UnknownRoute => "UnknownRoute",
            CoreError::DuplicateUser => "DuplicateUser",
            CoreError::DuplicateLicensePlate => "DuplicateLicensePlate",
            CoreError::DuplicateMessageCode => "DuplicateMessageCode",
            CoreError::IncompleteRegistration => "IncompleteRegistration",
            CoreError::EmailAlreadyVerified => "EmailAlreadyVerified",
            CoreError::DatabaseUnavailable(_) => "DatabaseUnavailable",
            CoreError::IdentityProviderUnavailable(_) => "IdentityProviderUnavailable",
            CoreError::ExternalUserCreationFailed(_) => "ExternalUserCreationFailed",
            CoreError::MessageCatalogLoadFailed(_) => "MessageCatalogLoadFailed",
            CoreError::TransactionBeginFailed(_) => "TransactionBeginFailed",
            CoreError::TransactionCommitFailed(_) => "TransactionCommitFailed",
            CoreError::OperationFailed(_) => "OperationFailed",
            CoreError::UserCannotSave(_) => "UserCannotSave",
            CoreError::FlightCannotSave(_) => "FlightCannotSave",
            CoreError::FlightCannotUpdate(_) => "FlightCannotUpdate",
            CoreError::FlightCannotDelete(_) => "FlightCannotDelete",
            CoreError::RequestCancelled => "RequestCancelled",
            CoreError::ServerError(_) => "ServerError",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CoreError::InvalidJson(_)
            | CoreError::InvalidRequest(_)
            | CoreError::InvalidId
            | CoreError::InvalidDateFormat(_)
            | CoreError::StartDateAfterEndDate
            | CoreError::InvalidTimeSequence
            | CoreError::InvalidPilotRole(_)
            | CoreError::InvalidApproachType(_)
            | CoreError::InvalidFlightType(_)
            | CoreError::RoleRequired
            | CoreError::InvalidToken
            | CoreError::MessageCodeRequired
            | CoreError::InvalidMessageType(_)
            | CoreError::InvalidReference(_) => ErrorCategory::Client,

            CoreError::Unauthenticated(_)
            | CoreError::BadCredentials
            | CoreError::Unauthorized
            | CoreError::Forbidden(_) => ErrorCategory::Auth,

            CoreError::NotFound(_) | CoreError::UnknownRoute => ErrorCategory::NotFound,

            CoreError::DuplicateUser
            | CoreError::DuplicateLicensePlate
            | CoreError::DuplicateMessageCode
            | CoreError::IncompleteRegistration
            | CoreError::EmailAlreadyVerified => ErrorCategory::Conflict,

            CoreError::DatabaseUnavailable(_)
            | CoreError::IdentityProviderUnavailable(_)
            | CoreError::ExternalUserCreationFailed(_)
            | CoreError::MessageCatalogLoadFailed(_) => ErrorCategory::Dependency,

            CoreError::TransactionBeginFailed(_)
            | CoreError::TransactionCommitFailed(_)
            | CoreError::OperationFailed(_)
            | CoreError::UserCannotSave(_)
            | CoreError::FlightCannotSave(_)
            | CoreError::FlightCannotUpdate(_)
            | CoreError::FlightCannotDelete(_)
            | CoreError::RequestCancelled
            | CoreError::ServerError(_) => ErrorCategory::Server,
        }
    }

    /// True for failures a higher layer may retry (connection loss, timeouts).
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            CoreError::DatabaseUnavailable(_) | CoreError::IdentityProviderUnavailable(_)
        )
    }
}
