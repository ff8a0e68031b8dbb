//! Renders response envelopes through the message catalog.
//!
//! Handlers and [`crate::error::AppError`] write the envelope with the code
//! as a placeholder message and attach the [`Envelope`]. This layer is the
//! one place that turns a code into catalog content, so the same code
//! yields the same text on every endpoint.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::CONTENT_LENGTH;
use axum::middleware::Next;
use axum::response::Response;

use crate::response::Envelope;
use crate::state::AppState;

pub async fn render_envelope(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    let (mut parts, body) = response.into_parts();

    let Some(envelope) = parts.extensions.remove::<Envelope>() else {
        return Response::from_parts(parts, body);
    };

    let message = state.messages.format(envelope.code, &envelope.args);
    match serde_json::to_vec(&envelope.render(message)) {
        Ok(bytes) => {
            parts.headers.remove(CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(err) => {
            tracing::error!(error = %err, code = envelope.code, "Envelope rendering failed");
            Response::from_parts(parts, body)
        }
    }
}
