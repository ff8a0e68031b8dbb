//! Identity-provider collaborator.
//!
//! [`IdentityProvider`] is the seam the provisioning orchestrator and the
//! auth pass-throughs depend on; [`KeycloakClient`] is the production
//! implementation over the Keycloak admin REST API and OIDC token endpoint.

pub mod action_token;
pub mod config;
pub mod error;
pub mod keycloak;
pub mod provider;

pub use action_token::{ActionTokenConfig, ActionTokenVerifier};
pub use config::KeycloakConfig;
pub use error::{IdentityError, IdentityErrorKind};
pub use keycloak::KeycloakClient;
pub use provider::{ExternalUser, IdentityProvider, NewExternalUser, TokenSet};
