//! Database error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate: {0}")]
    Duplicate(String),

    /// A row was rejected by a table constraint other than the primary key.
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type DbResult<T> = std::result::Result<T, DbError>;

impl From<DbError> for plinth_core::Error {
    fn from(err: DbError) -> Self {
        plinth_core::Error::Store(err.to_string())
    }
}

/// Map a failed insert, turning unique-key violations into `Duplicate` and
/// check violations into `Constraint`.
pub(crate) fn insert_error(err: sqlx::Error, what: String) -> DbError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => DbError::Duplicate(what),
        sqlx::Error::Database(db) if db.is_check_violation() => {
            DbError::Constraint(format!("{}: {}", what, db.message()))
        }
        other => DbError::Database(other),
    }
}
