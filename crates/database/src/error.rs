use core_types::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid database connection settings: {0}")]
    ConnectionConfigError(String),

    #[error("Database error: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Student '{0}' not found")]
    NotFound(String),

    #[error("A student named '{0}' already exists")]
    DuplicateName(String),
}

impl DbError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::NotFound(_) => ErrorKind::NotFound,
            DbError::DuplicateName(_) => ErrorKind::Conflict,
            DbError::ConnectionConfigError(_)
            | DbError::QueryError(_)
            | DbError::MigrationError(_) => ErrorKind::Infrastructure,
        }
    }
}

/// Maps a failed INSERT, turning a unique-key violation into `DuplicateName`.
pub(crate) fn map_insert_error(error: sqlx::Error, name: &str) -> DbError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            return DbError::DuplicateName(name.to_string());
        }
    }
    DbError::from(error)
}
