//! Identity-provider errors and their classification.

use flighthours_core::error::{CoreError, Entity};

/// Errors from the identity-provider client.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// Connection refused, DNS failure or timeout.
    #[error("Identity provider unreachable: {0}")]
    Unreachable(String),

    #[error("{0} not found in identity provider")]
    NotFound(String),

    #[error("Identity provider conflict: {0}")]
    Conflict(String),

    #[error("Invalid credentials")]
    BadCredentials,

    /// Non-2xx status with no more specific meaning.
    #[error("Identity provider error ({status}): {body}")]
    Api { status: u16, body: String },

    /// A 2xx response the client could not interpret.
    #[error("Unexpected identity provider response: {0}")]
    Protocol(String),
}

/// Coarse classification used by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityErrorKind {
    /// Retryable at a higher layer, never here.
    Unavailable,
    /// Expected absence.
    NotFound,
    Conflict,
    BadCredentials,
    Operational,
}

impl IdentityError {
    pub fn kind(&self) -> IdentityErrorKind {
        match self {
            IdentityError::Unreachable(_) => IdentityErrorKind::Unavailable,
            IdentityError::NotFound(_) => IdentityErrorKind::NotFound,
            IdentityError::Conflict(_) => IdentityErrorKind::Conflict,
            IdentityError::BadCredentials => IdentityErrorKind::BadCredentials,
            IdentityError::Api { status, .. } => match status {
                404 => IdentityErrorKind::NotFound,
                409 => IdentityErrorKind::Conflict,
                502..=504 => IdentityErrorKind::Unavailable,
                _ => IdentityErrorKind::Operational,
            },
            IdentityError::Protocol(_) => IdentityErrorKind::Operational,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.kind() == IdentityErrorKind::Unavailable
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == IdentityErrorKind::NotFound
    }

    /// Map to the domain error, using `operational` for failures that have
    /// no more specific code in the calling context.
    pub fn into_core(self, operational: fn(String) -> CoreError) -> CoreError {
        match self.kind() {
            IdentityErrorKind::Unavailable => {
                CoreError::IdentityProviderUnavailable(self.to_string())
            }
            IdentityErrorKind::NotFound => CoreError::NotFound(Entity::User),
            IdentityErrorKind::Conflict => CoreError::DuplicateUser,
            IdentityErrorKind::BadCredentials => CoreError::BadCredentials,
            IdentityErrorKind::Operational => operational(self.to_string()),
        }
    }
}

impl From<reqwest::Error> for IdentityError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            IdentityError::Unreachable(err.to_string())
        } else {
            IdentityError::Protocol(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn api(status: u16) -> IdentityError {
        IdentityError::Api {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn gateway_failures_are_unavailability() {
        assert_eq!(api(503).kind(), IdentityErrorKind::Unavailable);
        assert_eq!(api(504).kind(), IdentityErrorKind::Unavailable);
        assert!(IdentityError::Unreachable("refused".into()).is_unavailable());
    }

    #[test]
    fn status_codes_refine_the_kind() {
        assert_eq!(api(404).kind(), IdentityErrorKind::NotFound);
        assert_eq!(api(409).kind(), IdentityErrorKind::Conflict);
        assert_eq!(api(500).kind(), IdentityErrorKind::Operational);
        assert_eq!(api(400).kind(), IdentityErrorKind::Operational);
    }

    #[test]
    fn domain_mapping_keeps_unavailability_distinct_from_credentials() {
        assert_matches!(
            IdentityError::Unreachable("timeout".into()).into_core(CoreError::OperationFailed),
            CoreError::IdentityProviderUnavailable(_)
        );
        assert_matches!(
            IdentityError::BadCredentials.into_core(CoreError::OperationFailed),
            CoreError::BadCredentials
        );
        assert_matches!(
            api(500).into_core(CoreError::ExternalUserCreationFailed),
            CoreError::ExternalUserCreationFailed(_)
        );
        assert_matches!(
            IdentityError::NotFound("user".into()).into_core(CoreError::OperationFailed),
            CoreError::NotFound(Entity::User)
        );
    }
}
