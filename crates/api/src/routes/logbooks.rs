use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::{flights, logbooks};
use crate::state::AppState;

/// Daily logbook routes mounted at `/daily-logbooks`.
///
/// ```text
/// GET    /                -> list_logbooks
/// POST   /                -> create_logbook
/// GET    /{id}            -> get_logbook
/// PUT    /{id}            -> update_logbook
/// DELETE /{id}            -> delete_logbook
/// PATCH  /{id}/activate   -> activate_logbook
/// PATCH  /{id}/deactivate -> deactivate_logbook
/// GET    /{id}/details    -> flights::list_flights
/// POST   /{id}/details    -> flights::create_flight
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(logbooks::list_logbooks).post(logbooks::create_logbook),
        )
        .route(
            "/{id}",
            get(logbooks::get_logbook)
                .put(logbooks::update_logbook)
                .delete(logbooks::delete_logbook),
        )
        .route("/{id}/activate", patch(logbooks::activate_logbook))
        .route("/{id}/deactivate", patch(logbooks::deactivate_logbook))
        .route(
            "/{id}/details",
            get(flights::list_flights).post(flights::create_flight),
        )
}
