//! Application linkage repository.
//!
//! Only the platform-facing slice of an application record is touched here:
//! lookups by platform and the bulk rebuild marker.

use async_trait::async_trait;
use plinth_core::App;
use sqlx::PgPool;

use crate::error::insert_error;
use crate::{DbError, DbResult};

#[async_trait]
pub trait AppRepo: Send + Sync {
    async fn insert(&self, app: &App) -> DbResult<()>;
    async fn get_by_name(&self, name: &str) -> DbResult<App>;
    async fn find_by_platform(&self, platform: &str) -> DbResult<Vec<App>>;
    async fn count_by_platform(&self, platform: &str) -> DbResult<u64>;
    /// Set `update_platform` on every app built on `platform` in a single
    /// write. Returns the number of apps flagged.
    async fn mark_platform_updated(&self, platform: &str) -> DbResult<u64>;
}

/// Database row for apps.
#[derive(Debug, Clone, sqlx::FromRow)]
struct AppRow {
    name: String,
    platform: String,
    update_platform: bool,
}

impl From<AppRow> for App {
    fn from(row: AppRow) -> Self {
        App {
            name: row.name,
            platform: row.platform,
            update_platform: row.update_platform,
        }
    }
}

/// PostgreSQL implementation of AppRepo.
pub struct PgAppRepo {
    pool: PgPool,
}

impl PgAppRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppRepo for PgAppRepo {
    async fn insert(&self, app: &App) -> DbResult<()> {
        sqlx::query("INSERT INTO apps (name, platform, update_platform) VALUES ($1, $2, $3)")
            .bind(&app.name)
            .bind(&app.platform)
            .bind(app.update_platform)
            .execute(&self.pool)
            .await
            .map_err(|e| insert_error(e, format!("app {}", app.name)))?;
        Ok(())
    }

    async fn get_by_name(&self, name: &str) -> DbResult<App> {
        let row = sqlx::query_as::<_, AppRow>(
            "SELECT name, platform, update_platform FROM apps WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("app {}", name)))?;
        Ok(row.into())
    }

    async fn find_by_platform(&self, platform: &str) -> DbResult<Vec<App>> {
        let rows = sqlx::query_as::<_, AppRow>(
            "SELECT name, platform, update_platform FROM apps WHERE platform = $1 ORDER BY name",
        )
        .bind(platform)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(App::from).collect())
    }

    async fn count_by_platform(&self, platform: &str) -> DbResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM apps WHERE platform = $1")
            .bind(platform)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn mark_platform_updated(&self, platform: &str) -> DbResult<u64> {
        let result = sqlx::query("UPDATE apps SET update_platform = TRUE WHERE platform = $1")
            .bind(platform)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
