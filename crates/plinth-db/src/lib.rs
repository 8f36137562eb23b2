//! Database layer for Plinth.
//!
//! Platform and app repositories, each with a PostgreSQL and an in-memory
//! implementation, plus the embedded schema migrations. Connection pools are
//! built by the caller from its own settings.

pub mod error;
pub mod repo;

pub use error::{DbError, DbResult};
pub use repo::*;

use sqlx::PgPool;
use sqlx::migrate::Migrator;

/// Schema migrations, embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Bring the `platforms` and `apps` tables up to date.
pub async fn run_migrations(pool: &PgPool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}
