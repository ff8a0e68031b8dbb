//! Domain model structs, filters and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity (or joined view) matching the query row
//! - A `Deserialize` filter for list queries, rejecting unknown keys
//! - `Deserialize` request DTOs where the entity is writable

pub mod aircraft_model;
pub mod aircraft_registration;
pub mod airline;
pub mod airline_route;
pub mod airport;
pub mod daily_logbook;
pub mod employee;
pub mod engine;
pub mod flight;
pub mod manufacturer;
pub mod message;
pub mod route;

use serde::Deserialize;

/// Filter for collections that accept no query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoFilter {}
