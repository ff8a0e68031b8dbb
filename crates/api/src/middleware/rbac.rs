//! Role-based access control extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use flighthours_core::error::CoreError;
use flighthours_core::roles::ROLE_ADMIN;

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Requires the `admin` realm role. Rejects with `Forbidden` otherwise.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.caller.has_role(ROLE_ADMIN) {
            return Err(CoreError::Forbidden("Admin role required".into()).into());
        }
        Ok(RequireAdmin(user))
    }
}
