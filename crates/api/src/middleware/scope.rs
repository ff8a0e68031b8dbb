//! Per-request [`RequestScope`] extractor.

use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use flighthours_core::scope::{Caller, RequestScope};
use tokio_util::sync::DropGuard;

use crate::error::AppError;
use crate::state::AppState;

/// Header set by `SetRequestIdLayer`; its value becomes the trace id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The request scope for one handler invocation.
///
/// Dropping it cancels the scope's token. When the handler future is
/// dropped (timeout, client gone) every call still bounded by the scope
/// stops at its next suspension point.
pub struct Scope {
    inner: RequestScope,
    _cancel_on_drop: DropGuard,
}

impl Scope {
    pub fn new(inner: RequestScope) -> Self {
        let guard = inner.cancellation().clone().drop_guard();
        Self {
            inner,
            _cancel_on_drop: guard,
        }
    }

    pub fn with_caller(self, caller: Caller) -> Self {
        Self {
            inner: self.inner.with_caller(caller),
            _cancel_on_drop: self._cancel_on_drop,
        }
    }
}

impl Deref for Scope {
    type Target = RequestScope;

    fn deref(&self) -> &RequestScope {
        &self.inner
    }
}

impl FromRequestParts<AppState> for Scope {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let trace_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Ok(Scope::new(RequestScope::new(trace_id, state.config.budgets)))
    }
}
