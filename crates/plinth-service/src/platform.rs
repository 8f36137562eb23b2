//! Platform service.
//!
//! The store is the source of truth for whether a platform exists. Adds and
//! updates only touch the store once every builder accepted the change.
//! Removal is the exception: once no app depends on the platform the record
//! is deleted even if a builder failed to clean up, so builder artifacts may
//! outlive a removed platform but a record never outlives a removal.

use plinth_builder::BuilderRegistry;
use plinth_core::{Error, Platform, PlatformOptions, Result};
use plinth_db::{AppRepo, DbError, PlatformFilter, PlatformRepo};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Orchestrates platform lifecycle across the store, the builders and the
/// apps that depend on each platform.
pub struct PlatformService {
    registry: Arc<BuilderRegistry>,
    platforms: Arc<dyn PlatformRepo>,
    apps: Arc<dyn AppRepo>,
}

impl PlatformService {
    pub fn new(
        registry: Arc<BuilderRegistry>,
        platforms: Arc<dyn PlatformRepo>,
        apps: Arc<dyn AppRepo>,
    ) -> Self {
        Self {
            registry,
            platforms,
            apps,
        }
    }

    pub fn registry(&self) -> &Arc<BuilderRegistry> {
        &self.registry
    }

    /// List platforms in insertion order, optionally hiding disabled ones.
    pub async fn platforms(&self, enabled_only: bool) -> Result<Vec<Platform>> {
        let platforms = self
            .platforms
            .find_all(PlatformFilter::from_enabled_only(enabled_only))
            .await?;
        Ok(platforms)
    }

    pub async fn get_platform(&self, name: &str) -> Result<Platform> {
        match self.platforms.find_by_name(name).await {
            Ok(platform) => Ok(platform),
            Err(DbError::NotFound(_)) => Err(Error::InvalidPlatform),
            Err(e) => Err(e.into()),
        }
    }

    /// Create a platform on every builder, then record it.
    ///
    /// Nothing is stored when a builder fails.
    pub async fn platform_add(&self, opts: PlatformOptions) -> Result<()> {
        if opts.name.is_empty() {
            return Err(Error::PlatformNameMissing);
        }
        if self.find(&opts.name).await?.is_some() {
            return Err(Error::DuplicatePlatform);
        }

        self.registry.platform_add(&opts).await?;

        match self.platforms.insert(&Platform::new(opts.name.as_str())).await {
            Ok(()) => {}
            // Lost a race against a concurrent add of the same name.
            Err(DbError::Duplicate(_)) => return Err(Error::DuplicatePlatform),
            Err(e) => return Err(e.into()),
        }

        info!(platform = %opts.name, "Platform added");
        Ok(())
    }

    /// Update a platform on every builder, then apply the disabled flag and
    /// flag dependent apps for rebuild if new build content was supplied.
    ///
    /// An absent, empty or unparseable `disabled` argument leaves the stored
    /// flag as it was.
    pub async fn platform_update(&self, opts: PlatformOptions) -> Result<()> {
        if opts.name.is_empty() {
            return Err(Error::PlatformNameMissing);
        }
        if self.find(&opts.name).await?.is_none() {
            return Err(Error::PlatformNotFound);
        }

        self.registry.platform_update(&opts).await?;

        match opts.disabled() {
            Ok(Some(disabled)) => {
                match self.platforms.update_disabled(&opts.name, disabled).await {
                    Ok(()) => {}
                    Err(DbError::NotFound(_)) => return Err(Error::PlatformNotFound),
                    Err(e) => return Err(e.into()),
                }
            }
            Ok(None) => {}
            Err(raw) => {
                warn!(
                    platform = %opts.name,
                    value = %raw,
                    "Ignoring unparseable disabled argument"
                );
            }
        }

        // Disabling alone produces no new artifact, so apps are left alone.
        if opts.has_new_build_content() {
            let flagged = self.apps.mark_platform_updated(&opts.name).await?;
            info!(
                platform = %opts.name,
                apps = flagged,
                "Flagged apps for platform rebuild"
            );
        }

        info!(platform = %opts.name, "Platform updated");
        Ok(())
    }

    /// Remove a platform that no app depends on.
    ///
    /// The record is deleted whatever the builders report; a builder failure
    /// is returned after the deletion.
    pub async fn platform_remove(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::PlatformNameMissing);
        }
        if self.find(name).await?.is_none() {
            return Err(Error::PlatformNotFound);
        }

        let apps = self.apps.count_by_platform(name).await?;
        if apps > 0 {
            return Err(Error::PlatformInUse {
                name: name.to_string(),
                apps,
            });
        }

        let cleanup = self.registry.platform_remove(name).await;

        if let Err(e) = self.platforms.delete(name).await {
            if let Err(cleanup_err) = &cleanup {
                error!(platform = %name, error = %cleanup_err, "Builder cleanup failed");
            }
            return Err(match e {
                DbError::NotFound(_) => Error::PlatformNotFound,
                other => other.into(),
            });
        }

        if let Err(e) = cleanup {
            error!(platform = %name, error = %e, "Platform removed but builder cleanup failed");
            return Err(e);
        }

        info!(platform = %name, "Platform removed");
        Ok(())
    }

    async fn find(&self, name: &str) -> Result<Option<Platform>> {
        match self.platforms.find_by_name(name).await {
            Ok(platform) => Ok(Some(platform)),
            Err(DbError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
