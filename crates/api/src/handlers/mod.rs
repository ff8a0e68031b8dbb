//! Axum handlers, one module per resource.
//!
//! Handlers extract, call a service, and wrap the result in an
//! [`ApiResponse`](crate::response::ApiResponse). They never build
//! envelopes or map errors themselves.

pub mod accounts;
pub mod aircraft_registrations;
pub mod airline_employees;
pub mod flights;
pub mod health;
pub mod logbooks;
pub mod messages;
pub mod reference;

use flighthours_core::error::CoreError;

use crate::error::AppError;

/// Fallback for requests no route matches.
pub async fn unknown_route() -> AppError {
    CoreError::UnknownRoute.into()
}
