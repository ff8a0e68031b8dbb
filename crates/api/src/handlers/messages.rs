use axum::extract::State;
use flighthours_core::codes;
use flighthours_db::models::message::{Message, MessageFilter, SaveMessage};
use serde::Serialize;

use crate::error::AppResult;
use crate::extract::{IdPath, ValidJson, ValidQuery};
use crate::middleware::rbac::RequireAdmin;
use crate::response::{ApiResponse, Linked};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ReloadResult {
    pub count: usize,
    pub generation: u64,
}

/// GET /api/v1/messages
pub async fn list_messages(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidQuery(filter): ValidQuery<MessageFilter>,
) -> AppResult<ApiResponse<Vec<Message>>> {
    let messages = state.services.messages.list(&admin.scope, &filter).await?;
    Ok(ApiResponse::listed(messages))
}

/// GET /api/v1/messages/{id}
pub async fn get_message(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<Message>> {
    let message = state.services.messages.get(&admin.scope, id).await?;
    Ok(ApiResponse::found(message))
}

/// POST /api/v1/messages
pub async fn create_message(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidJson(input): ValidJson<SaveMessage>,
) -> AppResult<ApiResponse<Linked<Message>>> {
    let message = state.services.messages.create(&admin.scope, input).await?;
    let url = state.resource_url("messages", message.id);
    Ok(ApiResponse::created(
        codes::RESOURCE_CREATED,
        Linked::new(message, url.clone()),
        url,
    ))
}

/// PUT /api/v1/messages/{id}
pub async fn update_message(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    IdPath(id): IdPath,
    ValidJson(input): ValidJson<SaveMessage>,
) -> AppResult<ApiResponse<Message>> {
    let message = state.services.messages.update(&admin.scope, id, input).await?;
    Ok(ApiResponse::updated(message))
}

/// DELETE /api/v1/messages/{id}
pub async fn delete_message(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse> {
    state.services.messages.delete(&admin.scope, id).await?;
    Ok(ApiResponse::ack(codes::RESOURCE_DELETED))
}

/// POST /api/v1/messages/reload
///
/// The response message renders `${0}` with the new count.
pub async fn reload_messages(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<ApiResponse<ReloadResult>> {
    let count = state.services.messages.reload(&admin.scope).await?;
    let result = ReloadResult {
        count,
        generation: state.messages.generation(),
    };
    Ok(ApiResponse::with_code(codes::MESSAGES_RELOADED, result).with_args(vec![count.to_string()]))
}
