/// All primary keys are 128-bit UUIDs generated by the service.
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh internal identifier.
pub fn new_id() -> DbId {
    uuid::Uuid::new_v4()
}
