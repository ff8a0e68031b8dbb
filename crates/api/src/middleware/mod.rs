pub mod auth;
pub mod rbac;
pub mod render;
pub mod scope;
