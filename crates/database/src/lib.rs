//! # Database Crate
//!
//! The persistence gateway for student grade records. It hides the store
//! behind the [`GradeRepository`] trait so the web layer never touches SQL.
//!
//! ## Public API
//!
//! - `connect`: establishes the PostgreSQL connection pool.
//! - `run_migrations`: applies the embedded schema migrations.
//! - `GradeRepository`: the async CRUD contract.
//! - `DbRepository`: the PostgreSQL implementation, backed by a `PgPool`.
//! - `InMemoryRepository`: a map-backed implementation for tests and local runs.
//! - `DbError`: the errors this crate returns, each mapped to an `ErrorKind`.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod memory;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations, ConnectionState};
pub use error::DbError;
pub use memory::InMemoryRepository;
pub use repository::{DbRepository, GradeRepository};
