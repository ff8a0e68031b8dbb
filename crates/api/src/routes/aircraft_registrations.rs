use axum::routing::get;
use axum::Router;

use crate::handlers::aircraft_registrations;
use crate::state::AppState;

/// Aircraft registration routes mounted at `/aircraft-registrations`.
///
/// ```text
/// GET  /      -> list_registrations
/// POST /      -> create_registration
/// GET  /{id}  -> get_registration
/// PUT  /{id}  -> update_registration
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(aircraft_registrations::list_registrations)
                .post(aircraft_registrations::create_registration),
        )
        .route(
            "/{id}",
            get(aircraft_registrations::get_registration)
                .put(aircraft_registrations::update_registration),
        )
}
