//! Registration, login, email verification and password changes.

use axum::extract::State;
use flighthours_core::codes;
use flighthours_core::provisioning::Reconciliation;
use flighthours_db::models::employee::{Employee, RegisterEmployee};
use flighthours_identity::TokenSet;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{validated, IdPath, ValidJson};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::middleware::scope::Scope;
use crate::response::{ApiResponse, Linked};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Body carrying an identity-provider action token.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ActionTokenRequest {
    #[validate(length(min = 1))]
    pub token: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 1))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct EmailRequest {
    #[validate(length(min = 1))]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct ReconcileResult {
    pub email: String,
    pub outcome: Reconciliation,
}

/// POST /api/v1/register
pub async fn register(
    State(state): State<AppState>,
    scope: Scope,
    ValidJson(input): ValidJson<RegisterEmployee>,
) -> AppResult<ApiResponse<Linked<Employee>>> {
    let employee = state.services.provisioning.register(&scope, input).await?;
    let url = state.resource_url("employees", employee.id);
    Ok(ApiResponse::created(
        codes::USER_REGISTERED,
        Linked::new(employee, url.clone()),
        url,
    ))
}

/// POST /api/v1/login
pub async fn login(
    State(state): State<AppState>,
    scope: Scope,
    ValidJson(input): ValidJson<LoginRequest>,
) -> AppResult<ApiResponse<TokenSet>> {
    let input = validated(input)?;
    let tokens = state
        .services
        .accounts
        .login(&scope, &input.email, &input.password)
        .await?;
    Ok(ApiResponse::with_code(codes::LOGIN_SUCCEEDED, tokens))
}

/// POST /api/v1/verify-email
pub async fn verify_email(
    State(state): State<AppState>,
    scope: Scope,
    ValidJson(input): ValidJson<ActionTokenRequest>,
) -> AppResult<ApiResponse> {
    let input = validated(input)?;
    state.services.accounts.verify_email(&scope, &input.token).await?;
    Ok(ApiResponse::ack(codes::EMAIL_VERIFIED))
}

/// POST /api/v1/update-password
pub async fn update_password(
    State(state): State<AppState>,
    scope: Scope,
    ValidJson(input): ValidJson<UpdatePasswordRequest>,
) -> AppResult<ApiResponse> {
    let input = validated(input)?;
    state
        .services
        .accounts
        .update_password(&scope, &input.token, &input.new_password)
        .await?;
    Ok(ApiResponse::ack(codes::PASSWORD_UPDATED))
}

/// POST /api/v1/resend-verification
pub async fn resend_verification(
    State(state): State<AppState>,
    scope: Scope,
    ValidJson(input): ValidJson<EmailRequest>,
) -> AppResult<ApiResponse> {
    let input = validated(input)?;
    state.services.accounts.resend_verification(&scope, &input.email).await?;
    Ok(ApiResponse::ack(codes::VERIFICATION_EMAIL_SENT))
}

/// POST /api/v1/reconcile
///
/// Clean up a half-registered account so the email can register again.
pub async fn reconcile(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidJson(input): ValidJson<EmailRequest>,
) -> AppResult<ApiResponse<ReconcileResult>> {
    let input = validated(input)?;
    let outcome = state.services.provisioning.reconcile(&admin.scope, &input.email).await?;
    Ok(ApiResponse::with_code(
        codes::REGISTRATION_RECONCILED,
        ReconcileResult {
            email: input.email.trim().to_lowercase(),
            outcome,
        },
    ))
}

/// GET /api/v1/me
pub async fn me(State(state): State<AppState>, user: AuthUser) -> AppResult<ApiResponse<Employee>> {
    let employee = state.services.accounts.me(&user.scope).await?;
    Ok(ApiResponse::found(employee))
}

/// GET /api/v1/employees/{id}
pub async fn get_employee(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<Employee>> {
    let employee = state.services.accounts.employee(&user.scope, id).await?;
    Ok(ApiResponse::found(employee))
}
