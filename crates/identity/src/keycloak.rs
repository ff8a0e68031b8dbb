//! Keycloak implementation of [`IdentityProvider`].
//!
//! Admin calls authenticate with a password-grant token for the admin user
//! against `admin_realm`. The token is cached and refreshed shortly before
//! it expires.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;

use crate::config::KeycloakConfig;
use crate::error::IdentityError;
use crate::provider::{ExternalUser, IdentityProvider, NewExternalUser, TokenSet};

/// Refresh the admin token this long before Keycloak would reject it.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(30);

/// Client used by the admin user.
const ADMIN_CLIENT_ID: &str = "admin-cli";

struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct AdminToken {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct RoleRepresentation {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct OidcError {
    error: String,
}

/// HTTP client for one Keycloak realm.
pub struct KeycloakClient {
    http: reqwest::Client,
    config: KeycloakConfig,
    admin_token: Mutex<Option<CachedToken>>,
}

impl KeycloakClient {
    pub fn new(config: KeycloakConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(http: reqwest::Client, config: KeycloakConfig) -> Self {
        Self {
            http,
            config,
            admin_token: Mutex::new(None),
        }
    }

    fn admin_url(&self, path: &str) -> String {
        format!(
            "{}/admin/realms/{}{}",
            self.config.base(),
            self.config.realm,
            path
        )
    }

    fn token_url(&self, realm: &str) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.config.base(),
            realm
        )
    }

    /// A valid admin bearer token, fetching a new one when needed.
    async fn admin_token(&self) -> Result<String, IdentityError> {
        let mut cached = self.admin_token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() + TOKEN_REFRESH_MARGIN {
                return Ok(token.value.clone());
            }
        }

        let response = self
            .http
            .post(self.token_url(&self.config.admin_realm))
            .form(&[
                ("grant_type", "password"),
                ("client_id", ADMIN_CLIENT_ID),
                ("username", self.config.admin_username.as_str()),
                ("password", self.config.admin_password.as_str()),
            ])
            .send()
            .await?;
        let token: AdminToken = check_status(response, "admin token").await?.json().await?;

        tracing::debug!(expires_in = token.expires_in, "Refreshed identity-provider admin token");
        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });
        Ok(value)
    }

    async fn admin_get(&self, path: &str) -> Result<Response, IdentityError> {
        let token = self.admin_token().await?;
        Ok(self
            .http
            .get(self.admin_url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    async fn admin_send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Response, IdentityError> {
        let token = self.admin_token().await?;
        let mut request = self
            .http
            .request(method, self.admin_url(path))
            .bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        Ok(request.send().await?)
    }
}

/// Turn a non-2xx response into an error. `what` names the resource for
/// not-found reporting.
async fn check_status(response: Response, what: &str) -> Result<Response, IdentityError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::NOT_FOUND => IdentityError::NotFound(what.to_string()),
        StatusCode::CONFLICT => IdentityError::Conflict(body),
        _ => IdentityError::Api {
            status: status.as_u16(),
            body,
        },
    })
}

/// The new user's id is the last segment of the `Location` header.
fn id_from_location(response: &Response) -> Result<String, IdentityError> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|location| location.trim_end_matches('/').rsplit('/').next())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| IdentityError::Protocol("user created without a Location header".into()))
}

#[async_trait]
impl IdentityProvider for KeycloakClient {
    async fn create_user(&self, user: &NewExternalUser) -> Result<String, IdentityError> {
        let body = json!({
            "username": user.username,
            "email": user.email,
            "firstName": user.first_name,
            "lastName": user.last_name,
            "enabled": true,
            "emailVerified": false,
            "attributes": { "employee_id": [user.employee_id] },
        });
        let response = self
            .admin_send(reqwest::Method::POST, "/users", Some(body))
            .await?;
        let response = check_status(response, "user").await?;
        id_from_location(&response)
    }

    async fn set_password(
        &self,
        user_id: &str,
        password: &str,
        temporary: bool,
    ) -> Result<(), IdentityError> {
        let body = json!({ "type": "password", "value": password, "temporary": temporary });
        let response = self
            .admin_send(
                reqwest::Method::PUT,
                &format!("/users/{user_id}/reset-password"),
                Some(body),
            )
            .await?;
        check_status(response, "user").await?;
        Ok(())
    }

    async fn assign_role(&self, user_id: &str, role: &str) -> Result<(), IdentityError> {
        let response = self.admin_get(&format!("/roles/{role}")).await?;
        let role: RoleRepresentation = check_status(response, "role").await?.json().await?;

        let body = json!([{ "id": role.id, "name": role.name }]);
        let response = self
            .admin_send(
                reqwest::Method::POST,
                &format!("/users/{user_id}/role-mappings/realm"),
                Some(body),
            )
            .await?;
        check_status(response, "user").await?;
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), IdentityError> {
        let response = self
            .admin_send(reqwest::Method::DELETE, &format!("/users/{user_id}"), None)
            .await?;
        check_status(response, "user").await?;
        Ok(())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<ExternalUser, IdentityError> {
        let token = self.admin_token().await?;
        let response = self
            .http
            .get(self.admin_url("/users"))
            .query(&[("email", email), ("exact", "true")])
            .bearer_auth(token)
            .send()
            .await?;
        let users: Vec<ExternalUser> = check_status(response, "user").await?.json().await?;
        users
            .into_iter()
            .find(|user| {
                user.email
                    .as_deref()
                    .is_some_and(|found| found.eq_ignore_ascii_case(email))
            })
            .ok_or_else(|| IdentityError::NotFound("user".into()))
    }

    async fn send_verification_email(&self, email: &str) -> Result<(), IdentityError> {
        let user = self.get_user_by_email(email).await?;
        let response = self
            .admin_send(
                reqwest::Method::PUT,
                &format!("/users/{}/send-verify-email", user.id),
                None,
            )
            .await?;
        check_status(response, "user").await?;
        Ok(())
    }

    async fn mark_email_verified(&self, user_id: &str) -> Result<(), IdentityError> {
        let response = self
            .admin_send(
                reqwest::Method::PUT,
                &format!("/users/{user_id}"),
                Some(json!({ "emailVerified": true })),
            )
            .await?;
        check_status(response, "user").await?;
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> Result<TokenSet, IdentityError> {
        let mut form = vec![
            ("grant_type", "password"),
            ("client_id", self.config.client_id.as_str()),
            ("username", username),
            ("password", password),
            ("scope", "openid"),
        ];
        if !self.config.client_secret.is_empty() {
            form.push(("client_secret", self.config.client_secret.as_str()));
        }

        let response = self
            .http
            .post(self.token_url(&self.config.realm))
            .form(&form)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(IdentityError::BadCredentials),
            StatusCode::BAD_REQUEST => {
                let body = response.text().await.unwrap_or_default();
                match serde_json::from_str::<OidcError>(&body) {
                    Ok(err) if err.error == "invalid_grant" => Err(IdentityError::BadCredentials),
                    _ => Err(IdentityError::Api { status: 400, body }),
                }
            }
            _ => Ok(check_status(response, "token").await?.json().await?),
        }
    }
}
