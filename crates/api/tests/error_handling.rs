//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly. The message field still holds the
//! code here; catalog rendering happens in the router's middleware.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use flighthours_api::error::{status_for, AppError};
use flighthours_core::error::{CoreError, Entity, Reference};
use http_body_util::BodyExt;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Test: envelope shape
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failure_envelope_has_no_data() {
    let (status, json) = error_to_response(CoreError::NotFound(Entity::DailyLogbook).into()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "DailyLogbookNotFound");
    assert_eq!(json["message"], "DailyLogbookNotFound");
    assert!(json.get("data").is_none());
}

// ---------------------------------------------------------------------------
// Test: client errors map to 400
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validation_errors_return_400() {
    let (status, json) = error_to_response(CoreError::InvalidTimeSequence.into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "InvalidTimeSequence");

    let (status, json) =
        error_to_response(CoreError::InvalidReference(Reference::Aircraft).into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], Reference::Aircraft.code());
}

// ---------------------------------------------------------------------------
// Test: the auth category splits between 401 and 403
// ---------------------------------------------------------------------------

#[test]
fn unauthenticated_and_forbidden_are_distinct() {
    assert_eq!(
        status_for(&CoreError::Unauthenticated("no token".into())),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(status_for(&CoreError::BadCredentials), StatusCode::UNAUTHORIZED);
    assert_eq!(status_for(&CoreError::Unauthorized), StatusCode::FORBIDDEN);
    assert_eq!(
        status_for(&CoreError::Forbidden("admin only".into())),
        StatusCode::FORBIDDEN
    );
}

// ---------------------------------------------------------------------------
// Test: conflicts map to 409
// ---------------------------------------------------------------------------

#[tokio::test]
async fn conflicts_return_409() {
    for err in [
        CoreError::DuplicateUser,
        CoreError::IncompleteRegistration,
        CoreError::DuplicateLicensePlate,
        CoreError::EmailAlreadyVerified,
    ] {
        let code = err.code();
        let (status, json) = error_to_response(err.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["code"], code);
    }
}

// ---------------------------------------------------------------------------
// Test: dependency failures are not reported as server bugs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dependency_failures_return_424() {
    let (status, json) =
        error_to_response(CoreError::IdentityProviderUnavailable("timed out".into()).into()).await;
    assert_eq!(status, StatusCode::FAILED_DEPENDENCY);
    assert_eq!(json["code"], "IdentityProviderUnavailable");

    let (status, _) =
        error_to_response(CoreError::DatabaseUnavailable("refused".into()).into()).await;
    assert_eq!(status, StatusCode::FAILED_DEPENDENCY);
}

// ---------------------------------------------------------------------------
// Test: server errors return 500 without leaking detail
// ---------------------------------------------------------------------------

#[tokio::test]
async fn server_errors_return_500_and_hide_detail() {
    let err = CoreError::TransactionCommitFailed("password=hunter2".into());
    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "TransactionCommitFailed");
    assert!(!json.to_string().contains("hunter2"));
}
