use axum::extract::State;
use flighthours_core::codes;
use flighthours_db::models::daily_logbook::{DailyLogbook, LogbookFilter, SaveDailyLogbook};

use crate::error::AppResult;
use crate::extract::{IdPath, ValidJson, ValidQuery};
use crate::middleware::auth::AuthUser;
use crate::response::{ApiResponse, Linked};
use crate::state::AppState;

/// GET /api/v1/daily-logbooks
///
/// The caller's own logbooks, newest first.
pub async fn list_logbooks(
    State(state): State<AppState>,
    user: AuthUser,
    ValidQuery(filter): ValidQuery<LogbookFilter>,
) -> AppResult<ApiResponse<Vec<DailyLogbook>>> {
    let logbooks = state.services.logbooks.list(&user.scope, &filter).await?;
    Ok(ApiResponse::listed(logbooks))
}

/// GET /api/v1/daily-logbooks/{id}
pub async fn get_logbook(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<DailyLogbook>> {
    let logbook = state.services.logbooks.get(&user.scope, id).await?;
    Ok(ApiResponse::found(logbook))
}

/// POST /api/v1/daily-logbooks
pub async fn create_logbook(
    State(state): State<AppState>,
    user: AuthUser,
    ValidJson(input): ValidJson<SaveDailyLogbook>,
) -> AppResult<ApiResponse<Linked<DailyLogbook>>> {
    let logbook = state.services.logbooks.create(&user.scope, input).await?;
    let url = state.resource_url("daily-logbooks", logbook.id);
    Ok(ApiResponse::created(
        codes::RESOURCE_CREATED,
        Linked::new(logbook, url.clone()),
        url,
    ))
}

/// PUT /api/v1/daily-logbooks/{id}
pub async fn update_logbook(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
    ValidJson(input): ValidJson<SaveDailyLogbook>,
) -> AppResult<ApiResponse<DailyLogbook>> {
    let logbook = state.services.logbooks.update(&user.scope, id, input).await?;
    Ok(ApiResponse::updated(logbook))
}

/// DELETE /api/v1/daily-logbooks/{id}
///
/// Removes the logbook and every segment in it.
pub async fn delete_logbook(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse> {
    state.services.logbooks.delete(&user.scope, id).await?;
    Ok(ApiResponse::ack(codes::RESOURCE_DELETED))
}

/// PATCH /api/v1/daily-logbooks/{id}/activate
pub async fn activate_logbook(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse> {
    state.services.logbooks.set_status(&user.scope, id, true).await?;
    Ok(ApiResponse::ack(codes::RESOURCE_ACTIVATED))
}

/// PATCH /api/v1/daily-logbooks/{id}/deactivate
pub async fn deactivate_logbook(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse> {
    state.services.logbooks.set_status(&user.scope, id, false).await?;
    Ok(ApiResponse::ack(codes::RESOURCE_DEACTIVATED))
}
