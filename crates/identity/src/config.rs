//! Keycloak connection settings.

use std::fmt;

#[derive(Clone)]
pub struct KeycloakConfig {
    /// Base URL without trailing slash, e.g. `https://sso.example.com`.
    pub server_url: String,
    /// Realm holding the pilot accounts.
    pub realm: String,
    /// OIDC client used for the password grant.
    pub client_id: String,
    /// Empty for public clients.
    pub client_secret: String,
    pub admin_username: String,
    pub admin_password: String,
    /// Realm the admin user authenticates against (usually `master`).
    pub admin_realm: String,
}

impl KeycloakConfig {
    pub(crate) fn base(&self) -> &str {
        self.server_url.trim_end_matches('/')
    }

    /// Issuer URL of the realm's tokens.
    pub fn issuer(&self) -> String {
        format!("{}/realms/{}", self.base(), self.realm)
    }
}

impl fmt::Debug for KeycloakConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeycloakConfig")
            .field("server_url", &self.server_url)
            .field("realm", &self.realm)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"<redacted>")
            .field("admin_realm", &self.admin_realm)
            .finish()
    }
}
