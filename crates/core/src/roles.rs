//! Well-known role names carried in the identity provider's realm roles.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_PILOT: &str = "pilot";
