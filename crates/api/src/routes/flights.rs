use axum::routing::get;
use axum::Router;

use crate::handlers::flights;
use crate::state::AppState;

/// Flight routes mounted at `/daily-logbook-details`.
///
/// ```text
/// GET    /{id} -> get_flight
/// PUT    /{id} -> update_flight
/// DELETE /{id} -> delete_flight
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{id}",
        get(flights::get_flight)
            .put(flights::update_flight)
            .delete(flights::delete_flight),
    )
}
