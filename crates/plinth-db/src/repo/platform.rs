//! Platform repository.

use async_trait::async_trait;
use plinth_core::Platform;
use sqlx::PgPool;

use crate::error::insert_error;
use crate::{DbError, DbResult};

/// Which platforms a listing returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlatformFilter {
    #[default]
    All,
    EnabledOnly,
}

impl PlatformFilter {
    pub fn from_enabled_only(enabled_only: bool) -> Self {
        if enabled_only {
            Self::EnabledOnly
        } else {
            Self::All
        }
    }

    pub fn matches(&self, platform: &Platform) -> bool {
        match self {
            Self::All => true,
            Self::EnabledOnly => !platform.disabled,
        }
    }
}

/// Storage for platform records, keyed by unique name.
///
/// Implementations enforce name uniqueness themselves: `insert` fails with
/// [`DbError::Duplicate`] when the name is taken, whatever the caller checked
/// beforehand.
#[async_trait]
pub trait PlatformRepo: Send + Sync {
    async fn insert(&self, platform: &Platform) -> DbResult<()>;
    async fn find_by_name(&self, name: &str) -> DbResult<Platform>;
    /// List platforms in insertion order.
    async fn find_all(&self, filter: PlatformFilter) -> DbResult<Vec<Platform>>;
    async fn update_disabled(&self, name: &str, disabled: bool) -> DbResult<()>;
    async fn delete(&self, name: &str) -> DbResult<()>;
}

/// Database row for platforms.
#[derive(Debug, Clone, sqlx::FromRow)]
struct PlatformRow {
    name: String,
    disabled: bool,
}

impl From<PlatformRow> for Platform {
    fn from(row: PlatformRow) -> Self {
        Platform {
            name: row.name,
            disabled: row.disabled,
        }
    }
}

/// PostgreSQL implementation of PlatformRepo.
pub struct PgPlatformRepo {
    pool: PgPool,
}

impl PgPlatformRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlatformRepo for PgPlatformRepo {
    async fn insert(&self, platform: &Platform) -> DbResult<()> {
        sqlx::query("INSERT INTO platforms (name, disabled) VALUES ($1, $2)")
            .bind(&platform.name)
            .bind(platform.disabled)
            .execute(&self.pool)
            .await
            .map_err(|e| insert_error(e, format!("platform {}", platform.name)))?;
        Ok(())
    }

    async fn find_by_name(&self, name: &str) -> DbResult<Platform> {
        let row = sqlx::query_as::<_, PlatformRow>(
            "SELECT name, disabled FROM platforms WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("platform {}", name)))?;
        Ok(row.into())
    }

    async fn find_all(&self, filter: PlatformFilter) -> DbResult<Vec<Platform>> {
        let rows = sqlx::query_as::<_, PlatformRow>(
            r#"
            SELECT name, disabled FROM platforms
            WHERE $1 = FALSE OR disabled = FALSE
            ORDER BY seq
            "#,
        )
        .bind(filter == PlatformFilter::EnabledOnly)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Platform::from).collect())
    }

    async fn update_disabled(&self, name: &str, disabled: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE platforms SET disabled = $2 WHERE name = $1")
            .bind(name)
            .bind(disabled)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("platform {}", name)));
        }
        Ok(())
    }

    async fn delete(&self, name: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM platforms WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("platform {}", name)));
        }
        Ok(())
    }
}
