//! In-memory repositories for development and tests.
//!
//! Each repository keeps its records behind a single `RwLock`, so every
//! check-then-write (such as the uniqueness check on insert) happens inside
//! one critical section.

use async_trait::async_trait;
use plinth_core::{App, Platform};
use tokio::sync::RwLock;

use crate::repo::app::AppRepo;
use crate::repo::platform::{PlatformFilter, PlatformRepo};
use crate::{DbError, DbResult};

/// In-memory implementation of PlatformRepo. Keeps insertion order.
#[derive(Default)]
pub struct MemoryPlatformRepo {
    platforms: RwLock<Vec<Platform>>,
}

impl MemoryPlatformRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.platforms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.platforms.read().await.is_empty()
    }

    /// Number of stored records with the given name.
    pub async fn count(&self, name: &str) -> usize {
        self.platforms
            .read()
            .await
            .iter()
            .filter(|p| p.name == name)
            .count()
    }
}

#[async_trait]
impl PlatformRepo for MemoryPlatformRepo {
    async fn insert(&self, platform: &Platform) -> DbResult<()> {
        let mut platforms = self.platforms.write().await;
        if platform.name.is_empty() {
            return Err(DbError::Constraint(
                "platform: name must not be empty".to_string(),
            ));
        }
        if platforms.iter().any(|p| p.name == platform.name) {
            return Err(DbError::Duplicate(format!("platform {}", platform.name)));
        }
        platforms.push(platform.clone());
        Ok(())
    }

    async fn find_by_name(&self, name: &str) -> DbResult<Platform> {
        self.platforms
            .read()
            .await
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .ok_or_else(|| DbError::NotFound(format!("platform {}", name)))
    }

    async fn find_all(&self, filter: PlatformFilter) -> DbResult<Vec<Platform>> {
        Ok(self
            .platforms
            .read()
            .await
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn update_disabled(&self, name: &str, disabled: bool) -> DbResult<()> {
        let mut platforms = self.platforms.write().await;
        let platform = platforms
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| DbError::NotFound(format!("platform {}", name)))?;
        platform.disabled = disabled;
        Ok(())
    }

    async fn delete(&self, name: &str) -> DbResult<()> {
        let mut platforms = self.platforms.write().await;
        let index = platforms
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| DbError::NotFound(format!("platform {}", name)))?;
        platforms.remove(index);
        Ok(())
    }
}

/// In-memory implementation of AppRepo.
#[derive(Default)]
pub struct MemoryAppRepo {
    apps: RwLock<Vec<App>>,
}

impl MemoryAppRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppRepo for MemoryAppRepo {
    async fn insert(&self, app: &App) -> DbResult<()> {
        let mut apps = self.apps.write().await;
        if apps.iter().any(|a| a.name == app.name) {
            return Err(DbError::Duplicate(format!("app {}", app.name)));
        }
        apps.push(app.clone());
        Ok(())
    }

    async fn get_by_name(&self, name: &str) -> DbResult<App> {
        self.apps
            .read()
            .await
            .iter()
            .find(|a| a.name == name)
            .cloned()
            .ok_or_else(|| DbError::NotFound(format!("app {}", name)))
    }

    async fn find_by_platform(&self, platform: &str) -> DbResult<Vec<App>> {
        Ok(self
            .apps
            .read()
            .await
            .iter()
            .filter(|a| a.platform == platform)
            .cloned()
            .collect())
    }

    async fn count_by_platform(&self, platform: &str) -> DbResult<u64> {
        let apps = self.apps.read().await;
        Ok(apps.iter().filter(|a| a.platform == platform).count() as u64)
    }

    async fn mark_platform_updated(&self, platform: &str) -> DbResult<u64> {
        let mut apps = self.apps.write().await;
        let mut flagged = 0;
        for app in apps.iter_mut().filter(|a| a.platform == platform) {
            app.update_platform = true;
            flagged += 1;
        }
        Ok(flagged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_find_all_keeps_insertion_order() {
        let repo = MemoryPlatformRepo::new();
        let want = vec![
            Platform::new("dea"),
            Platform::disabled("pecuniae"),
            Platform::new("money"),
            Platform::disabled("raise"),
            Platform::new("glass"),
        ];
        for p in &want {
            repo.insert(p).await.unwrap();
        }

        let all = repo.find_all(PlatformFilter::All).await.unwrap();
        assert_eq!(all, want);

        let enabled = repo.find_all(PlatformFilter::EnabledOnly).await.unwrap();
        let names: Vec<&str> = enabled.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["dea", "money", "glass"]);
    }

    #[tokio::test]
    async fn test_insert_duplicate() {
        let repo = MemoryPlatformRepo::new();
        repo.insert(&Platform::new("python")).await.unwrap();

        let err = repo.insert(&Platform::disabled("python")).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));
        assert_eq!(repo.count("python").await, 1);
        assert!(!repo.find_by_name("python").await.unwrap().disabled);
    }

    #[tokio::test]
    async fn test_insert_rejects_empty_name() {
        let repo = MemoryPlatformRepo::new();

        let err = repo.insert(&Platform::new("")).await.unwrap_err();
        assert!(matches!(err, DbError::Constraint(_)));
        assert!(repo.is_empty().await);
        assert_eq!(repo.count("").await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_have_one_winner() {
        let repo = Arc::new(MemoryPlatformRepo::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.insert(&Platform::new("python")).await
            }));
        }

        let mut won = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => won += 1,
                Err(DbError::Duplicate(_)) => duplicates += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(won, 1);
        assert_eq!(duplicates, 7);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = MemoryPlatformRepo::new();
        repo.insert(&Platform::new("python")).await.unwrap();

        repo.update_disabled("python", true).await.unwrap();
        assert!(repo.find_by_name("python").await.unwrap().disabled);

        let err = repo.update_disabled("ruby", true).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));

        repo.delete("python").await.unwrap();
        assert!(repo.is_empty().await);
        let err = repo.delete("python").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_mark_platform_updated() {
        let repo = MemoryAppRepo::new();
        repo.insert(&App::new("app1", "python")).await.unwrap();
        repo.insert(&App::new("app2", "python")).await.unwrap();
        repo.insert(&App::new("app3", "ruby")).await.unwrap();

        assert_eq!(repo.count_by_platform("python").await.unwrap(), 2);
        assert_eq!(repo.mark_platform_updated("python").await.unwrap(), 2);

        assert!(repo.get_by_name("app1").await.unwrap().update_platform);
        assert!(repo.get_by_name("app2").await.unwrap().update_platform);
        assert!(!repo.get_by_name("app3").await.unwrap().update_platform);
        assert_eq!(repo.find_by_platform("ruby").await.unwrap().len(), 1);
    }
}
