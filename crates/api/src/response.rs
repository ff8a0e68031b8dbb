//! Response envelopes.
//!
//! Every body this service writes has the same shape:
//!
//! ```text
//! { "success": true,  "code": "...", "message": "...", "data": ... }
//! { "success": false, "code": "...", "message": "..." }
//! ```
//!
//! Handlers return [`ApiResponse`] (or an [`AppError`]); both attach an
//! [`Envelope`] to the response extensions, and the rendering middleware
//! swaps the placeholder message for catalog content.

use axum::http::header::LOCATION;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use flighthours_core::codes;
use flighthours_core::error::CoreError;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::AppError;

/// The unrendered envelope, carried in response extensions.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub success: bool,
    pub code: &'static str,
    /// Positional arguments for `${n}` placeholders in the message.
    pub args: Vec<String>,
    pub data: Option<Value>,
}

impl Envelope {
    pub fn failure(code: &'static str) -> Self {
        Self {
            success: false,
            code,
            args: Vec::new(),
            data: None,
        }
    }

    /// The JSON body with `message` as its message text.
    pub fn render(&self, message: String) -> Value {
        let mut body = Map::new();
        body.insert("success".into(), Value::Bool(self.success));
        body.insert("code".into(), Value::String(self.code.to_string()));
        body.insert("message".into(), Value::String(message));
        if let Some(data) = &self.data {
            body.insert("data".into(), data.clone());
        }
        Value::Object(body)
    }

    /// Write the body with the code standing in for the message, and attach
    /// the envelope for the rendering middleware.
    pub fn into_response_with(self, status: StatusCode) -> Response {
        let body = self.render(self.code.to_string());
        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// Successful handler output.
#[derive(Debug)]
pub struct ApiResponse<T = ()> {
    status: StatusCode,
    code: &'static str,
    args: Vec<String>,
    data: Option<T>,
    location: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn with_code(code: &'static str, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            code,
            args: Vec::new(),
            data: Some(data),
            location: None,
        }
    }

    /// 200 `ResourceFound`.
    pub fn found(data: T) -> Self {
        Self::with_code(codes::RESOURCE_FOUND, data)
    }

    /// 200 `ResourcesListed`.
    pub fn listed(data: T) -> Self {
        Self::with_code(codes::RESOURCES_LISTED, data)
    }

    /// 200 `ResourceUpdated`.
    pub fn updated(data: T) -> Self {
        Self::with_code(codes::RESOURCE_UPDATED, data)
    }

    /// 201 with a `Location` header.
    pub fn created(code: &'static str, data: T, location: String) -> Self {
        Self {
            status: StatusCode::CREATED,
            location: Some(location),
            ..Self::with_code(code, data)
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }
}

impl ApiResponse<()> {
    /// 200 acknowledgement without `data`.
    pub fn ack(code: &'static str) -> Self {
        Self {
            status: StatusCode::OK,
            code,
            args: Vec::new(),
            data: None,
            location: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data = match self.data.as_ref().map(serde_json::to_value).transpose() {
            Ok(data) => data,
            Err(err) => {
                return AppError::Core(CoreError::ServerError(format!(
                    "response serialization failed: {err}"
                )))
                .into_response()
            }
        };

        let envelope = Envelope {
            success: true,
            code: self.code,
            args: self.args,
            data,
        };
        let mut response = envelope.into_response_with(self.status);

        if let Some(location) = self.location {
            match HeaderValue::from_str(&location) {
                Ok(value) => {
                    response.headers_mut().insert(LOCATION, value);
                }
                Err(_) => tracing::warn!(%location, "Location is not a valid header value"),
            }
        }
        response
    }
}

/// Hypermedia links attached to created resources.
#[derive(Debug, Clone, Serialize)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

/// A resource with its links flattened alongside its fields.
#[derive(Debug, Clone, Serialize)]
pub struct Linked<T> {
    #[serde(flatten)]
    pub resource: T,
    pub links: Links,
}

impl<T> Linked<T> {
    pub fn new(resource: T, self_link: String) -> Self {
        Self {
            resource,
            links: Links {
                self_link,
                parent: None,
            },
        }
    }

    pub fn with_parent(mut self, parent: String) -> Self {
        self.links.parent = Some(parent);
        self
    }
}
