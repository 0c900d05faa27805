use crate::connection::ConnectionState;
use crate::error::{map_insert_error, DbError};
use async_trait::async_trait;
use core_types::{AverageRange, GradeRecord, GradeUpdate, NewGradeRecord};
use sqlx::postgres::PgPool;

/// CRUD over the single collection of grade records, keyed by student name.
///
/// The API layer only ever sees this trait, so tests can hand it an
/// [`InMemoryRepository`](crate::InMemoryRepository) instead of a live pool.
/// Every operation is atomic for one record only.
#[async_trait]
pub trait GradeRepository: Send + Sync {
    /// All records, ordered by name.
    async fn list_all(&self) -> Result<Vec<GradeRecord>, DbError>;

    /// The record with exactly this name, if any.
    async fn find_by_name(&self, name: &str) -> Result<Option<GradeRecord>, DbError>;

    /// Inserts a new record with its average computed from the grades.
    /// Fails with `DuplicateName` if the name is taken.
    async fn create(&self, record: NewGradeRecord) -> Result<GradeRecord, DbError>;

    async fn update(&self, name: &str, update: GradeUpdate) -> Result<GradeRecord, DbError>;

    /// Removes the record and returns it.
    async fn delete(&self, name: &str) -> Result<GradeRecord, DbError>;

    /// Records with `min <= average <= max`, best average first.
    async fn find_by_average_range(&self, range: AverageRange) -> Result<Vec<GradeRecord>, DbError>;

    async fn count(&self) -> Result<i64, DbError>;

    async fn connection_state(&self) -> ConnectionState;
}

/// The PostgreSQL-backed repository.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts without the existence lookup. A taken name is reported by the
    /// primary key and surfaces as `DuplicateName`.
    async fn insert(&self, record: NewGradeRecord) -> Result<GradeRecord, DbError> {
        let average = record.grades.average();
        let created = sqlx::query_as::<_, GradeRecord>(
            r#"
            INSERT INTO grade_records (name, grade1, grade2, grade3, average)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING name, grade1, grade2, grade3, average, created_at, updated_at
            "#,
        )
        .bind(&record.name)
        .bind(record.grades.grade1)
        .bind(record.grades.grade2)
        .bind(record.grades.grade3)
        .bind(average)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &record.name))?;

        tracing::info!(name = %created.name, average = %created.average, "Grade record created.");
        Ok(created)
    }

    /// Closes the pool, waiting for checked-out connections to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database connection pool closed.");
    }
}

#[async_trait]
impl GradeRepository for DbRepository {
    async fn list_all(&self) -> Result<Vec<GradeRecord>, DbError> {
        let records = sqlx::query_as::<_, GradeRecord>(
            r#"
            SELECT name, grade1, grade2, grade3, average, created_at, updated_at
            FROM grade_records
            ORDER BY name COLLATE "C" ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<GradeRecord>, DbError> {
        let record = sqlx::query_as::<_, GradeRecord>(
            r#"
            SELECT name, grade1, grade2, grade3, average, created_at, updated_at
            FROM grade_records
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn create(&self, record: NewGradeRecord) -> Result<GradeRecord, DbError> {
        // Fast path only; the primary key is what actually guarantees uniqueness.
        if self.find_by_name(&record.name).await?.is_some() {
            return Err(DbError::DuplicateName(record.name));
        }

        let average = record.grades.average();
        let created = sqlx::query_as::<_, GradeRecord>(
            r#"
            INSERT INTO grade_records (name, grade1, grade2, grade3, average)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING name, grade1, grade2, grade3, average, created_at, updated_at
            "#,
        )
        .bind(&record.name)
        .bind(record.grades.grade1)
        .bind(record.grades.grade2)
        .bind(record.grades.grade3)
        .bind(average)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &record.name))?;

        tracing::info!(name = %created.name, average = %created.average, "Grade record created.");
        Ok(created)
    }

    async fn update(&self, name: &str, update: GradeUpdate) -> Result<GradeRecord, DbError> {
        let mut tx = self.pool.begin().await?;

        // Lock the row so concurrent partial updates don't overwrite each other's grades.
        let current = sqlx::query_as::<_, GradeRecord>(
            r#"
            SELECT name, grade1, grade2, grade3, average, created_at, updated_at
            FROM grade_records
            WHERE name = $1
            FOR UPDATE
            "#,
        )
        .bind(name)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::NotFound(name.to_string()))?;

        let grades = update.apply(current.grades());
        let updated = sqlx::query_as::<_, GradeRecord>(
            r#"
            UPDATE grade_records
            SET grade1 = $2, grade2 = $3, grade3 = $4, average = $5, updated_at = now()
            WHERE name = $1
            RETURNING name, grade1, grade2, grade3, average, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(grades.grade1)
        .bind(grades.grade2)
        .bind(grades.grade3)
        .bind(grades.average())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(name = %updated.name, average = %updated.average, "Grade record updated.");
        Ok(updated)
    }

    async fn delete(&self, name: &str) -> Result<GradeRecord, DbError> {
        let removed = sqlx::query_as::<_, GradeRecord>(
            r#"
            DELETE FROM grade_records
            WHERE name = $1
            RETURNING name, grade1, grade2, grade3, average, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(name.to_string()))?;

        tracing::info!(name = %removed.name, "Grade record deleted.");
        Ok(removed)
    }

    async fn find_by_average_range(&self, range: AverageRange) -> Result<Vec<GradeRecord>, DbError> {
        let records = sqlx::query_as::<_, GradeRecord>(
            r#"
            SELECT name, grade1, grade2, grade3, average, created_at, updated_at
            FROM grade_records
            WHERE average >= $1 AND average <= $2
            ORDER BY average DESC, name COLLATE "C" ASC
            "#,
        )
        .bind(range.min)
        .bind(range.max)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn count(&self) -> Result<i64, DbError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM grade_records")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn connection_state(&self) -> ConnectionState {
        if self.pool.is_closed() {
            return ConnectionState::Closed;
        }
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => ConnectionState::Connected,
            Err(e) => {
                tracing::warn!(error = %e, "Database did not answer the health check.");
                ConnectionState::Unreachable
            }
        }
    }
}
