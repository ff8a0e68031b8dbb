//! Request extractors that report failures through [`AppError`].

use axum::extract::{FromRequest, FromRequestParts, Path};
use axum::http::request::Parts;
use flighthours_core::error::CoreError;
use flighthours_core::types::DbId;
use validator::Validate;

use crate::error::AppError;
use crate::state::AppState;

/// JSON body; a malformed body is `InvalidJSON`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ValidJson<T>(pub T);

/// Query-string filter; unknown or malformed keys are `InvalidRequest`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ValidQuery<T>(pub T);

/// A single `{id}` path segment, in internal or public form.
///
/// Anything the codec cannot resolve (including a blank segment) is
/// `InvalidID`.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub DbId);

impl FromRequestParts<AppState> for IdPath {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| CoreError::InvalidId)?;
        state
            .codec
            .resolve(&raw)
            .map(IdPath)
            .ok_or(AppError::Core(CoreError::InvalidId))
    }
}

/// Run `validator` rules on a request body.
pub fn validated<T: Validate>(input: T) -> Result<T, CoreError> {
    input
        .validate()
        .map_err(|errors| CoreError::InvalidRequest(errors.to_string()))?;
    Ok(input)
}
