use axum::routing::{get, post};
use axum::Router;

use crate::handlers::messages;
use crate::state::AppState;

/// Message catalog routes mounted at `/messages`.
///
/// ```text
/// GET    /        -> list_messages
/// POST   /        -> create_message
/// POST   /reload  -> reload_messages
/// GET    /{id}    -> get_message
/// PUT    /{id}    -> update_message
/// DELETE /{id}    -> delete_message
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(messages::list_messages).post(messages::create_message),
        )
        .route("/reload", post(messages::reload_messages))
        .route(
            "/{id}",
            get(messages::get_message)
                .put(messages::update_message)
                .delete(messages::delete_message),
        )
}
