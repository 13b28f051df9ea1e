/// All database primary keys are SQLite INTEGER PRIMARY KEY (rowid aliases).
pub type DbId = i64;

/// Identifier the service desk assigns to a created request.
pub type ExternalRequestId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
