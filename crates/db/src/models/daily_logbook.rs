//! Daily logbook entity model and DTOs.

use chrono::NaiveDate;
use flighthours_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `daily_logbooks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailyLogbook {
    pub id: DbId,
    pub log_date: NaiveDate,
    pub employee_id: DbId,
    pub book_page: Option<i32>,
    pub status: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Create/replace body. The owner always comes from the caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveDailyLogbook {
    pub log_date: String,
    pub book_page: Option<i32>,
    pub status: Option<bool>,
}

/// Validated logbook fields.
#[derive(Debug, Clone)]
pub struct LogbookFields {
    pub log_date: NaiveDate,
    pub book_page: Option<i32>,
    pub status: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogbookFilter {
    pub status: Option<bool>,
}
