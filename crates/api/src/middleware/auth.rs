//! Bearer-token authentication extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use flighthours_core::error::CoreError;
use flighthours_core::scope::Caller;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::middleware::scope::Scope;
use crate::state::AppState;

/// Authenticated caller plus a request scope that carries it.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<ApiResponse<()>> {
///     let employee_id = user.scope.employee_id()?;
///     ...
/// }
/// ```
pub struct AuthUser {
    pub caller: Caller,
    pub scope: Scope,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| CoreError::Unauthenticated("Missing Authorization header".into()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            CoreError::Unauthenticated(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            )
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|err| {
            tracing::debug!(error = %err, "Bearer token rejected");
            CoreError::Unauthenticated("Invalid or expired token".into())
        })?;

        let scope = Scope::from_request_parts(parts, state).await?;
        let employee_id = state
            .services
            .accounts
            .employee_for_subject(&scope, &claims.sub)
            .await?;

        let caller = Caller {
            external_user_id: claims.sub.clone(),
            email: claims.email.clone(),
            roles: claims.roles(),
            employee_id,
        };

        Ok(AuthUser {
            scope: scope.with_caller(caller.clone()),
            caller,
        })
    }
}
