use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use flighthours_core::error::{CoreError, ErrorCategory};

use crate::response::Envelope;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and the extractor rejections. Every variant renders
/// through the same `{success:false, code, message}` envelope; the message
/// text is filled in from the catalog by
/// [`crate::middleware::render::render_envelope`].
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Body was not valid JSON for the target type.
    #[error(transparent)]
    Json(#[from] JsonRejection),

    /// Query string did not match the filter type.
    #[error(transparent)]
    Query(#[from] QueryRejection),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn into_core(self) -> CoreError {
        match self {
            AppError::Core(err) => err,
            AppError::Json(rejection) => CoreError::InvalidJson(rejection.body_text()),
            AppError::Query(rejection) => CoreError::InvalidRequest(rejection.body_text()),
        }
    }
}

/// HTTP status for a domain error.
///
/// Driven by [`CoreError::category`], with the auth category split between
/// 401 (who are you) and 403 (you may not).
pub fn status_for(err: &CoreError) -> StatusCode {
    match err.category() {
        ErrorCategory::Client => StatusCode::BAD_REQUEST,
        ErrorCategory::Auth => match err {
            CoreError::Unauthenticated(_) | CoreError::BadCredentials => StatusCode::UNAUTHORIZED,
            _ => StatusCode::FORBIDDEN,
        },
        ErrorCategory::NotFound => StatusCode::NOT_FOUND,
        ErrorCategory::Conflict => StatusCode::CONFLICT,
        ErrorCategory::Dependency => StatusCode::FAILED_DEPENDENCY,
        ErrorCategory::Server => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let err = self.into_core();
        let status = status_for(&err);

        match err.category() {
            ErrorCategory::Server => {
                tracing::error!(code = err.code(), error = %err, "Request failed")
            }
            ErrorCategory::Dependency => {
                tracing::warn!(code = err.code(), error = %err, "Dependency failure")
            }
            _ => tracing::debug!(code = err.code(), error = %err, "Request rejected"),
        }

        Envelope::failure(err.code()).into_response_with(status)
    }
}
