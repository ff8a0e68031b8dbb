//! Success codes rendered through the message catalog.
//!
//! Error codes come from [`crate::error::CoreError::code`]; these cover the
//! `success: true` side of the envelope.

pub const RESOURCE_FOUND: &str = "ResourceFound";
pub const RESOURCES_LISTED: &str = "ResourcesListed";
pub const RESOURCE_CREATED: &str = "ResourceCreated";
pub const RESOURCE_UPDATED: &str = "ResourceUpdated";
pub const RESOURCE_DELETED: &str = "ResourceDeleted";
pub const RESOURCE_ACTIVATED: &str = "ResourceActivated";
pub const RESOURCE_DEACTIVATED: &str = "ResourceDeactivated";

pub const USER_REGISTERED: &str = "UserRegistered";
pub const LOGIN_SUCCEEDED: &str = "LoginSucceeded";
pub const EMAIL_VERIFIED: &str = "EmailVerified";
pub const PASSWORD_UPDATED: &str = "PasswordUpdated";
pub const VERIFICATION_EMAIL_SENT: &str = "VerificationEmailSent";
pub const REGISTRATION_RECONCILED: &str = "RegistrationReconciled";

/// Content carries `${0}`: the number of messages now cached.
pub const MESSAGES_RELOADED: &str = "MessagesReloaded";
