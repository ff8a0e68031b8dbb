//! Reference data routes, merged at the `/api/v1` root.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::reference;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/airlines", get(reference::list_airlines))
        .route("/airlines/{id}", get(reference::get_airline))
        .route("/airlines/{id}/activate", patch(reference::activate_airline))
        .route("/airlines/{id}/deactivate", patch(reference::deactivate_airline))
        .route("/airports", get(reference::list_airports))
        .route("/airports/{id}", get(reference::get_airport))
        .route("/airports/{id}/activate", patch(reference::activate_airport))
        .route("/airports/{id}/deactivate", patch(reference::deactivate_airport))
        .route("/cities/{city}", get(reference::airports_by_city))
        .route("/countries/{country}", get(reference::airports_by_country))
        .route("/airport-types/{airport_type}", get(reference::airports_by_type))
        .route("/routes", get(reference::list_routes))
        .route("/routes/{id}", get(reference::get_route))
        .route("/airline-routes", get(reference::list_airline_routes))
        .route("/airline-routes/{id}", get(reference::get_airline_route))
        .route(
            "/airline-routes/{id}/activate",
            patch(reference::activate_airline_route),
        )
        .route(
            "/airline-routes/{id}/deactivate",
            patch(reference::deactivate_airline_route),
        )
        .route("/aircraft-models", get(reference::list_aircraft_models))
        .route("/aircraft-models/{id}", get(reference::get_aircraft_model))
        .route(
            "/aircraft-models/{id}/activate",
            patch(reference::activate_aircraft_model),
        )
        .route(
            "/aircraft-models/{id}/deactivate",
            patch(reference::deactivate_aircraft_model),
        )
        .route("/aircraft-families/{family}", get(reference::models_by_family))
        .route("/engines", get(reference::list_engines))
        .route("/engines/{id}", get(reference::get_engine))
        .route("/manufacturers", get(reference::list_manufacturers))
        .route("/manufacturers/{id}", get(reference::get_manufacturer))
}
