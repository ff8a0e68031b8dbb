//! Integration tests for registration, login and the account endpoints.

mod common;

use axum::http::header::LOCATION;
use axum::http::{Method, StatusCode};
use common::{action_token, action_token_signed_with, body_json, send, TestApp};
use flighthours_core::roles::ROLE_ADMIN;
use serde_json::{json, Value};

fn registration(email: &str, role: &str) -> Value {
    json!({
        "name": "Laura Restrepo",
        "email": email,
        "password": "Temp#2024",
        "identification_number": "1032456789",
        "role": role,
        "start_date": "2024-01-15"
    })
}

// ---------------------------------------------------------------------------
// Test: register then log in
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_then_login() {
    let app = TestApp::new().await;

    let response = send(
        app.router(),
        Method::POST,
        "/api/v1/register",
        None,
        Some(registration("laura@example.com", "pilot")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response.headers().get(LOCATION).unwrap().to_str().unwrap().to_string();
    assert!(location.starts_with("/api/v1/employees/"));
    let json = body_json(response).await;
    assert_eq!(json["code"], "UserRegistered");
    assert_eq!(json["data"]["email"], "laura@example.com");
    assert_eq!(json["data"]["email_verified"], false);
    assert!(json["data"].get("keycloak_user_id").is_none());

    let response = send(
        app.router(),
        Method::POST,
        "/api/v1/login",
        None,
        Some(json!({ "email": "Laura@Example.com", "password": "Temp#2024" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["code"], "LoginSucceeded");
    assert!(json["data"]["access_token"].as_str().unwrap().starts_with("access-"));
}

#[tokio::test]
async fn registration_without_role_is_rejected() {
    let app = TestApp::new().await;

    let response = send(
        app.router(),
        Method::POST,
        "/api/v1/register",
        None,
        Some(registration("laura@example.com", "")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "RoleRequired");
    assert!(app.identity.calls.lock().is_empty());
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = TestApp::new().await;
    app.pilot("laura@example.com");

    let response = send(
        app.router(),
        Method::POST,
        "/api/v1/register",
        None,
        Some(registration("laura@example.com", "pilot")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "DuplicateUser");
}

#[tokio::test]
async fn wrong_password_is_bad_credentials() {
    let app = TestApp::new().await;
    app.services()
        .provisioning
        .register(
            &common::scope(),
            serde_json::from_value(registration("laura@example.com", "pilot")).unwrap(),
        )
        .await
        .unwrap();

    let response = send(
        app.router(),
        Method::POST,
        "/api/v1/login",
        None,
        Some(json!({ "email": "laura@example.com", "password": "nope" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "BadCredentials");
}

#[tokio::test]
async fn empty_login_fields_fail_validation() {
    let app = TestApp::new().await;

    let response = send(
        app.router(),
        Method::POST,
        "/api/v1/login",
        None,
        Some(json!({ "email": "", "password": "" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.identity.calls.lock().is_empty());
}

// ---------------------------------------------------------------------------
// Test: employee records
// ---------------------------------------------------------------------------

#[tokio::test]
async fn me_returns_the_callers_record() {
    let app = TestApp::new().await;
    let (pilot, token) = app.pilot("pilot@example.com");

    let response = send(app.router(), Method::GET, "/api/v1/me", Some(&token), None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["code"], "ResourceFound");
    assert_eq!(json["data"]["id"], pilot.id.to_string());
}

#[tokio::test]
async fn employee_records_are_private_except_to_admins() {
    let app = TestApp::new().await;
    let (pilot, _) = app.pilot("pilot@example.com");
    let (_, other) = app.pilot("other@example.com");
    let (_, admin) = app.seed_employee("admin@example.com", ROLE_ADMIN);
    let uri = format!("/api/v1/employees/{}", app.encode(pilot.id));

    let response = send(app.router(), Method::GET, &uri, Some(&other), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "Forbidden");

    let response = send(app.router(), Method::GET, &uri, Some(&admin), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["email"], "pilot@example.com");
}

// ---------------------------------------------------------------------------
// Test: action tokens
// ---------------------------------------------------------------------------

#[tokio::test]
async fn verify_email_marks_both_sides_once() {
    let app = TestApp::new().await;
    app.services()
        .provisioning
        .register(
            &common::scope(),
            serde_json::from_value(registration("laura@example.com", "pilot")).unwrap(),
        )
        .await
        .unwrap();
    let body = json!({ "token": action_token("Laura@Example.com") });

    let response = send(
        app.router(),
        Method::POST,
        "/api/v1/verify-email",
        None,
        Some(body.clone()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["code"], "EmailVerified");
    assert!(app.identity.user("laura@example.com").unwrap().email_verified);
    assert!(app.db.employee_by_email("laura@example.com").unwrap().email_verified);

    let response = send(app.router(), Method::POST, "/api/v1/verify-email", None, Some(body)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "EmailAlreadyVerified");
}

#[tokio::test]
async fn garbage_action_token_is_invalid() {
    let app = TestApp::new().await;

    let response = send(
        app.router(),
        Method::POST,
        "/api/v1/update-password",
        None,
        Some(json!({ "token": "not-a-token", "new_password": "N3w#pass" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "InvalidToken");
    assert!(!app.identity.called("set_password"));
}

#[tokio::test]
async fn update_password_refuses_a_token_not_signed_by_the_realm() {
    let app = TestApp::new().await;
    app.pilot("victim@example.com");
    let forged = action_token_signed_with("attacker-chosen-key", "victim@example.com");

    let response = send(
        app.router(),
        Method::POST,
        "/api/v1/update-password",
        None,
        Some(json!({ "token": forged, "new_password": "pwned" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "Unauthenticated");
    assert!(app.identity.passwords.lock().is_empty());
    assert!(!app.identity.called("set_password"));
    assert!(!app.identity.called("get_user_by_email"));
}

#[tokio::test]
async fn verify_email_refuses_a_token_not_signed_by_the_realm() {
    let app = TestApp::new().await;
    app.identity.seed_user("victim@example.com", false);
    let forged = action_token_signed_with("attacker-chosen-key", "victim@example.com");

    let response = send(
        app.router(),
        Method::POST,
        "/api/v1/verify-email",
        None,
        Some(json!({ "token": forged })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(!app.identity.user("victim@example.com").unwrap().email_verified);
    assert!(!app.identity.called("mark_email_verified"));
}

#[tokio::test]
async fn update_password_sets_a_permanent_password() {
    let app = TestApp::new().await;
    let (_, _) = app.pilot("pilot@example.com");
    let external = app.identity.user("pilot@example.com").unwrap();

    let response = send(
        app.router(),
        Method::POST,
        "/api/v1/update-password",
        None,
        Some(json!({ "token": action_token("pilot@example.com"), "new_password": "N3w#pass" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["code"], "PasswordUpdated");
    assert_eq!(
        *app.identity.passwords.lock(),
        vec![(external.id, "N3w#pass".to_string(), false)]
    );
}

// ---------------------------------------------------------------------------
// Test: reconciliation is an administrator operation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reconcile_requires_admin() {
    let app = TestApp::new().await;
    let (_, pilot) = app.pilot("pilot@example.com");
    let (_, admin) = app.seed_employee("admin@example.com", ROLE_ADMIN);
    app.identity.seed_user("orphan@example.com", false);
    let body = json!({ "email": "orphan@example.com" });

    let response = send(
        app.router(),
        Method::POST,
        "/api/v1/reconcile",
        Some(&pilot),
        Some(body.clone()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(app.identity.user("orphan@example.com").is_some());

    let response = send(
        app.router(),
        Method::POST,
        "/api/v1/reconcile",
        Some(&admin),
        Some(body),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["code"], "RegistrationReconciled");
    assert_eq!(json["data"]["outcome"], "removed_external");
    assert!(app.identity.user("orphan@example.com").is_none());
}
