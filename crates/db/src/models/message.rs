//! Message catalog entity model, filter and DTOs.

use flighthours_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Message {
    pub id: DbId,
    pub code: String,
    #[serde(rename = "type")]
    pub message_type: String,
    pub category: Option<String>,
    pub module: Option<String>,
    pub title: Option<String>,
    pub content: String,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Create/replace body.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveMessage {
    pub code: String,
    #[serde(rename = "type")]
    pub message_type: String,
    pub category: Option<String>,
    pub module: Option<String>,
    pub title: Option<String>,
    pub content: String,
    pub active: Option<bool>,
}

/// Validated message fields.
#[derive(Debug, Clone)]
pub struct MessageFields {
    pub code: String,
    pub message_type: String,
    pub category: Option<String>,
    pub module: Option<String>,
    pub title: Option<String>,
    pub content: String,
    pub active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageFilter {
    #[serde(rename = "type")]
    pub message_type: Option<String>,
    pub module: Option<String>,
    pub active: Option<bool>,
}
