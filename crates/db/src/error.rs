use sqlx::error::ErrorKind;

/// Store failures, classified by what the caller can do about them.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write. Expected when two handlers
    /// race on the same problem.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A foreign key points at a row that does not exist.
    #[error("Integrity violation: {0}")]
    Integrity(String),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                ErrorKind::UniqueViolation => {
                    return StoreError::Conflict(db_err.message().to_string());
                }
                ErrorKind::ForeignKeyViolation => {
                    return StoreError::Integrity(db_err.message().to_string());
                }
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}
