use axum::extract::State;
use flighthours_core::codes;
use flighthours_db::models::aircraft_registration::{
    AircraftRegistration, AircraftRegistrationFilter, SaveAircraftRegistration,
};

use crate::error::AppResult;
use crate::extract::{IdPath, ValidJson, ValidQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::{ApiResponse, Linked};
use crate::state::AppState;

/// GET /api/v1/aircraft-registrations
pub async fn list_registrations(
    State(state): State<AppState>,
    user: AuthUser,
    ValidQuery(filter): ValidQuery<AircraftRegistrationFilter>,
) -> AppResult<ApiResponse<Vec<AircraftRegistration>>> {
    let registrations = state.services.registrations.list(&user.scope, &filter).await?;
    Ok(ApiResponse::listed(registrations))
}

/// GET /api/v1/aircraft-registrations/{id}
pub async fn get_registration(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<AircraftRegistration>> {
    let registration = state.services.registrations.get(&user.scope, id).await?;
    Ok(ApiResponse::found(registration))
}

/// POST /api/v1/aircraft-registrations
pub async fn create_registration(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidJson(input): ValidJson<SaveAircraftRegistration>,
) -> AppResult<ApiResponse<Linked<AircraftRegistration>>> {
    let registration = state.services.registrations.create(&admin.scope, input).await?;
    let url = state.resource_url("aircraft-registrations", registration.id);
    Ok(ApiResponse::created(
        codes::RESOURCE_CREATED,
        Linked::new(registration, url.clone()),
        url,
    ))
}

/// PUT /api/v1/aircraft-registrations/{id}
pub async fn update_registration(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    IdPath(id): IdPath,
    ValidJson(input): ValidJson<SaveAircraftRegistration>,
) -> AppResult<ApiResponse<AircraftRegistration>> {
    let registration = state.services.registrations.update(&admin.scope, id, input).await?;
    Ok(ApiResponse::updated(registration))
}
