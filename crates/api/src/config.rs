//! Process configuration, read once from the environment at startup.

use std::str::FromStr;
use std::time::Duration;

use flighthours_core::id_codec::{IdCodecConfig, DEFAULT_MIN_LENGTH};
use flighthours_core::scope::Budgets;
use flighthours_db::PoolSettings;
use flighthours_identity::action_token::parse_algorithm;
use flighthours_identity::{ActionTokenConfig, KeycloakConfig};

use crate::auth::jwt::JwtConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Required, non-empty variable.
pub(crate) fn required(var: &'static str) -> Result<String, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(var)),
    }
}

/// Optional variable; empty counts as unset.
pub(crate) fn optional(var: &'static str) -> Option<String> {
    std::env::var(var).ok().filter(|value| !value.trim().is_empty())
}

fn parsed<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown drain in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Per-call budgets handed to every request scope.
    pub budgets: Budgets,
    /// Send the verification email after a successful registration.
    pub send_verification_email: bool,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load server configuration from environment variables.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`   | `30`                    |
    /// | `DB_TIMEOUT_MS`           | `5000`                  |
    /// | `IDP_TIMEOUT_MS`          | `10000`                 |
    /// | `COMPENSATION_TIMEOUT_MS` | `10000`                 |
    /// | `SEND_VERIFICATION_EMAIL` | `true`                  |
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = optional("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parsed("PORT", 3000)?;

        let cors_origins: Vec<String> = optional("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let defaults = Budgets::default();
        let budgets = Budgets {
            db: Duration::from_millis(parsed("DB_TIMEOUT_MS", defaults.db.as_millis() as u64)?),
            identity: Duration::from_millis(parsed(
                "IDP_TIMEOUT_MS",
                defaults.identity.as_millis() as u64,
            )?),
            compensation: Duration::from_millis(parsed(
                "COMPENSATION_TIMEOUT_MS",
                defaults.compensation.as_millis() as u64,
            )?),
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs: parsed("REQUEST_TIMEOUT_SECS", 30)?,
            shutdown_timeout_secs: parsed("SHUTDOWN_TIMEOUT_SECS", 30)?,
            budgets,
            send_verification_email: parsed("SEND_VERIFICATION_EMAIL", true)?,
            jwt: JwtConfig::from_env()?,
        })
    }
}

/// Database connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool: PoolSettings,
}

impl DatabaseConfig {
    /// | Env Var                   | Default  |
    /// |---------------------------|----------|
    /// | `DATABASE_URL`            | required |
    /// | `DB_MAX_CONNECTIONS`      | `20`     |
    /// | `DB_ACQUIRE_TIMEOUT_SECS` | `5`      |
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = PoolSettings::default();
        Ok(Self {
            url: required("DATABASE_URL")?,
            pool: PoolSettings {
                max_connections: parsed("DB_MAX_CONNECTIONS", defaults.max_connections)?,
                acquire_timeout: Duration::from_secs(parsed(
                    "DB_ACQUIRE_TIMEOUT_SECS",
                    defaults.acquire_timeout.as_secs(),
                )?),
            },
        })
    }
}

/// `ID_CODEC_SECRET` (required) and `ID_CODEC_MIN_LENGTH` (default 10).
pub fn id_codec_from_env() -> Result<IdCodecConfig, ConfigError> {
    Ok(IdCodecConfig {
        secret: required("ID_CODEC_SECRET")?,
        min_length: parsed("ID_CODEC_MIN_LENGTH", DEFAULT_MIN_LENGTH)?,
    })
}

/// Keycloak endpoint, realm and admin credentials.
///
/// | Env Var                   | Default  |
/// |---------------------------|----------|
/// | `KEYCLOAK_SERVER_URL`     | required |
/// | `KEYCLOAK_REALM`          | required |
/// | `KEYCLOAK_CLIENT_ID`      | required |
/// | `KEYCLOAK_CLIENT_SECRET`  | empty    |
/// | `KEYCLOAK_ADMIN`          | required |
/// | `KEYCLOAK_ADMIN_PASSWORD` | required |
/// | `KEYCLOAK_ADMIN_REALM`    | `master` |
pub fn keycloak_from_env() -> Result<KeycloakConfig, ConfigError> {
    Ok(KeycloakConfig {
        server_url: required("KEYCLOAK_SERVER_URL")?,
        realm: required("KEYCLOAK_REALM")?,
        client_id: required("KEYCLOAK_CLIENT_ID")?,
        client_secret: optional("KEYCLOAK_CLIENT_SECRET").unwrap_or_default(),
        admin_username: required("KEYCLOAK_ADMIN")?,
        admin_password: required("KEYCLOAK_ADMIN_PASSWORD")?,
        admin_realm: optional("KEYCLOAK_ADMIN_REALM").unwrap_or_else(|| "master".into()),
    })
}

/// Realm key for action tokens; the issuer defaults to the realm's.
///
/// | Env Var                           | Default                |
/// |-----------------------------------|------------------------|
/// | `KEYCLOAK_ACTION_TOKEN_SECRET`    | required               |
/// | `KEYCLOAK_ACTION_TOKEN_ALGORITHM` | `HS512`                |
/// | `KEYCLOAK_ISSUER`                 | `<url>/realms/<realm>` |
pub fn action_tokens_from_env(
    keycloak: &KeycloakConfig,
) -> Result<ActionTokenConfig, ConfigError> {
    let raw = optional("KEYCLOAK_ACTION_TOKEN_ALGORITHM").unwrap_or_else(|| "HS512".into());
    let algorithm = parse_algorithm(&raw).ok_or(ConfigError::Invalid {
        var: "KEYCLOAK_ACTION_TOKEN_ALGORITHM",
        value: raw.clone(),
    })?;
    Ok(ActionTokenConfig {
        secret: required("KEYCLOAK_ACTION_TOKEN_SECRET")?,
        algorithm,
        issuer: optional("KEYCLOAK_ISSUER").unwrap_or_else(|| keycloak.issuer()),
    })
}
