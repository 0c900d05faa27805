use crate::error::DbError;
use configuration::DatabaseSettings;
use sqlx::{postgres::PgPoolOptions, PgPool};

/// Establishes a connection pool to the PostgreSQL database.
///
/// The pool is created once at startup and shared by the whole process. A
/// failure here is meant to be fatal for the caller.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, DbError> {
    if settings.url.trim().is_empty() {
        return Err(DbError::ConnectionConfigError("DATABASE_URL must be set.".to_string()));
    }

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout())
        .connect(&settings.url)
        .await?;

    tracing::info!(max_connections = settings.max_connections, "Connected to the database.");
    Ok(pool)
}

/// Applies the embedded migrations, creating the `grade_records` table on a
/// fresh database.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Coarse health of the store, as reported by `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    /// The pool is open but the store did not answer.
    Unreachable,
    /// The pool has been shut down.
    Closed,
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Connected => "connected",
            ConnectionState::Unreachable => "unreachable",
            ConnectionState::Closed => "closed",
        }
    }
}
