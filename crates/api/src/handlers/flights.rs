use axum::extract::State;
use flighthours_core::codes;
use flighthours_db::models::flight::{FlightView, SaveFlight};

use crate::error::AppResult;
use crate::extract::{IdPath, ValidJson};
use crate::middleware::auth::AuthUser;
use crate::response::{ApiResponse, Linked};
use crate::state::AppState;

/// GET /api/v1/daily-logbooks/{id}/details
pub async fn list_flights(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(logbook_id): IdPath,
) -> AppResult<ApiResponse<Vec<FlightView>>> {
    let flights = state.services.flights.list_by_logbook(&user.scope, logbook_id).await?;
    Ok(ApiResponse::listed(flights))
}

/// POST /api/v1/daily-logbooks/{id}/details
pub async fn create_flight(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(logbook_id): IdPath,
    ValidJson(input): ValidJson<SaveFlight>,
) -> AppResult<ApiResponse<Linked<FlightView>>> {
    let flight = state.services.flights.create(&user.scope, logbook_id, &input).await?;
    let url = state.resource_url("daily-logbook-details", flight.flight.id);
    let parent = state.resource_url("daily-logbooks", logbook_id);
    Ok(ApiResponse::created(
        codes::RESOURCE_CREATED,
        Linked::new(flight, url.clone()).with_parent(parent),
        url,
    ))
}

/// GET /api/v1/daily-logbook-details/{id}
pub async fn get_flight(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<FlightView>> {
    let flight = state.services.flights.get(&user.scope, id).await?;
    Ok(ApiResponse::found(flight))
}

/// PUT /api/v1/daily-logbook-details/{id}
pub async fn update_flight(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
    ValidJson(input): ValidJson<SaveFlight>,
) -> AppResult<ApiResponse<FlightView>> {
    let flight = state.services.flights.update(&user.scope, id, &input).await?;
    Ok(ApiResponse::updated(flight))
}

/// DELETE /api/v1/daily-logbook-details/{id}
pub async fn delete_flight(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse> {
    state.services.flights.delete(&user.scope, id).await?;
    Ok(ApiResponse::ack(codes::RESOURCE_DELETED))
}
