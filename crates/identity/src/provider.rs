//! The identity-provider interface consumed by the services.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

/// Account to create in the identity provider.
#[derive(Debug, Clone)]
pub struct NewExternalUser {
    /// Login name; the normalized email.
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Local employee id, stored as a user attribute.
    pub employee_id: String,
}

impl NewExternalUser {
    /// Split a full name on the first space into first and last name.
    pub fn from_full_name(email: &str, full_name: &str, employee_id: String) -> Self {
        let full_name = full_name.trim();
        let (first, last) = full_name
            .split_once(' ')
            .map(|(first, last)| (first, last.trim()))
            .unwrap_or((full_name, ""));
        Self {
            username: email.to_string(),
            email: email.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            employee_id,
        }
    }
}

/// A user as the identity provider reports it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalUser {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub enabled: bool,
}

/// Tokens issued by a successful password grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: u64,
    pub refresh_expires_in: Option<u64>,
    pub token_type: String,
}

/// Operations on the external account store.
///
/// None of these calls are transactional; the provisioning orchestrator
/// pairs them with compensations.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create a user and return its external id.
    async fn create_user(&self, user: &NewExternalUser) -> Result<String, IdentityError>;

    async fn set_password(
        &self,
        user_id: &str,
        password: &str,
        temporary: bool,
    ) -> Result<(), IdentityError>;

    /// Grant a realm role.
    async fn assign_role(&self, user_id: &str, role: &str) -> Result<(), IdentityError>;

    async fn delete_user(&self, user_id: &str) -> Result<(), IdentityError>;

    /// Exact-match lookup. Absence is [`IdentityError::NotFound`].
    async fn get_user_by_email(&self, email: &str) -> Result<ExternalUser, IdentityError>;

    async fn send_verification_email(&self, email: &str) -> Result<(), IdentityError>;

    async fn mark_email_verified(&self, user_id: &str) -> Result<(), IdentityError>;

    /// Resource-owner password grant. Wrong credentials are
    /// [`IdentityError::BadCredentials`].
    async fn login(&self, username: &str, password: &str) -> Result<TokenSet, IdentityError>;
}
