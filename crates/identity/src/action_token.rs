//! Identity-provider action tokens.
//!
//! Verification and password links carry an action token signed with the
//! realm's HMAC key. Its signature, issuer, audience and expiry are all
//! checked before the target email is read, because the callers act on
//! that email through the admin API.

use std::fmt;

use flighthours_core::error::CoreError;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

/// Key and issuer the realm signs action tokens with.
#[derive(Clone)]
pub struct ActionTokenConfig {
    /// Realm HMAC secret.
    pub secret: String,
    /// One of `HS256`, `HS384`, `HS512`.
    pub algorithm: Algorithm,
    /// Realm issuer URL, e.g. `https://sso.example.com/realms/flighthours`.
    /// Action tokens carry it as both `iss` and `aud`.
    pub issuer: String,
}

impl fmt::Debug for ActionTokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionTokenConfig")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Only HMAC algorithms are accepted for realm action tokens.
pub fn parse_algorithm(raw: &str) -> Option<Algorithm> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "HS256" => Some(Algorithm::HS256),
        "HS384" => Some(Algorithm::HS384),
        "HS512" => Some(Algorithm::HS512),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct ActionClaims {
    eml: Option<String>,
    email: Option<String>,
    sub: Option<String>,
}

pub struct ActionTokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl ActionTokenVerifier {
    pub fn new(config: &ActionTokenConfig) -> Self {
        let mut validation = Validation::new(config.algorithm);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        Self {
            key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    /// Email addressed by `token`: the `eml` claim, then `email`, then `sub`.
    ///
    /// A token not signed by the realm is `Unauthenticated`; a malformed or
    /// expired one is `InvalidToken`.
    pub fn email(&self, token: &str) -> Result<String, CoreError> {
        let data = decode::<ActionClaims>(token.trim(), &self.key, &self.validation).map_err(
            |err| match err.kind() {
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidIssuer
                | ErrorKind::InvalidAudience => {
                    tracing::warn!(error = %err, "Action token not issued by the realm");
                    CoreError::Unauthenticated("action token rejected".into())
                }
                _ => {
                    tracing::debug!(error = %err, "Rejected action token");
                    CoreError::InvalidToken
                }
            },
        )?;

        let claims = data.claims;
        [claims.eml, claims.email, claims.sub]
            .into_iter()
            .flatten()
            .map(|value| value.trim().to_lowercase())
            .find(|value| !value.is_empty())
            .ok_or(CoreError::InvalidToken)
    }
}
