//! Relational store for users, memberships, e-mail tokens, roles and preferences.
//!
//! All repositories run over a single [`sqlx::AnyPool`] and render their SQL
//! once, at construction, for the [`Dialect`] of the connected database.

use std::time::Duration;

use sqlx::any::AnyPoolOptions;

pub mod dialect;
pub mod error;
pub mod models;
pub mod repositories;
pub mod schema;

pub use dialect::Dialect;
pub use error::DbError;

pub type DbPool = sqlx::AnyPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    sqlx::any::install_default_drivers();
    AnyPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
}

/// Create a pool over a private in-memory SQLite database.
///
/// Each SQLite in-memory connection is its own database, so the pool is
/// pinned to one connection that is never recycled.
pub async fn create_memory_pool() -> Result<DbPool, sqlx::Error> {
    sqlx::any::install_default_drivers();
    AnyPoolOptions::new()
        .min_connections(1)
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Create any missing tables for the given dialect.
pub async fn run_migrations(pool: &DbPool, dialect: Dialect) -> Result<(), sqlx::Error> {
    for statement in schema::statements(dialect) {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::debug!(?dialect, "Schema is up to date");
    Ok(())
}
