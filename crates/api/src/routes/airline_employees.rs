use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::airline_employees;
use crate::state::AppState;

/// Airline employee routes mounted at `/airline-employees`.
///
/// ```text
/// GET   /                -> list_airline_employees
/// POST  /                -> create_airline_employee
/// GET   /{id}            -> get_airline_employee
/// PUT   /{id}            -> update_airline_employee
/// PATCH /{id}/activate   -> activate_airline_employee
/// PATCH /{id}/deactivate -> deactivate_airline_employee
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(airline_employees::list_airline_employees)
                .post(airline_employees::create_airline_employee),
        )
        .route(
            "/{id}",
            get(airline_employees::get_airline_employee)
                .put(airline_employees::update_airline_employee),
        )
        .route(
            "/{id}/activate",
            patch(airline_employees::activate_airline_employee),
        )
        .route(
            "/{id}/deactivate",
            patch(airline_employees::deactivate_airline_employee),
        )
}
