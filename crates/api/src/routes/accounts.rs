use axum::routing::{get, post};
use axum::Router;

use crate::handlers::accounts;
use crate::state::AppState;

/// Account routes, merged at the `/api/v1` root.
///
/// ```text
/// POST /register             -> register
/// POST /login                -> login
/// POST /verify-email         -> verify_email
/// POST /update-password      -> update_password
/// POST /resend-verification  -> resend_verification
/// POST /reconcile            -> reconcile
/// GET  /me                   -> me
/// GET  /employees/{id}       -> get_employee
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        .route("/verify-email", post(accounts::verify_email))
        .route("/update-password", post(accounts::update_password))
        .route("/resend-verification", post(accounts::resend_verification))
        .route("/reconcile", post(accounts::reconcile))
        .route("/me", get(accounts::me))
        .route("/employees/{id}", get(accounts::get_employee))
}
