//! Builder registry.
//!
//! Holds every registered builder by name and fans platform lifecycle
//! operations out to all of them. Dispatch walks builders in name order and
//! stops at the first failure, so a deployment running several backends side
//! by side (say a legacy and a new one) treats each call as all-or-nothing and
//! the error always points at one backend.

use plinth_core::builder::{Builder, PlatformOperation, PlatformOptions};
use plinth_core::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

struct Inner {
    builders: BTreeMap<String, Arc<dyn Builder>>,
    default_builder: String,
}

/// Named set of builder backends plus the configured default.
pub struct BuilderRegistry {
    inner: RwLock<Inner>,
}

/// One platform operation, ready to be sent to each backend.
#[derive(Clone, Copy)]
enum Dispatch<'a> {
    Add(&'a PlatformOptions),
    Update(&'a PlatformOptions),
    Remove(&'a str),
}

impl Dispatch<'_> {
    fn operation(&self) -> PlatformOperation {
        match self {
            Dispatch::Add(_) => PlatformOperation::Add,
            Dispatch::Update(_) => PlatformOperation::Update,
            Dispatch::Remove(_) => PlatformOperation::Remove,
        }
    }

    fn platform(&self) -> &str {
        match self {
            Dispatch::Add(opts) | Dispatch::Update(opts) => &opts.name,
            Dispatch::Remove(name) => name,
        }
    }
}

impl BuilderRegistry {
    /// Create an empty registry whose default is `default_builder`.
    pub fn new(default_builder: impl Into<String>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                builders: BTreeMap::new(),
                default_builder: default_builder.into(),
            }),
        }
    }

    /// Register `builder` under `name`, replacing any previous registration.
    pub async fn register(&self, name: impl Into<String>, builder: Arc<dyn Builder>) {
        let name = name.into();
        debug!(builder = %name, "Registering builder");
        self.inner.write().await.builders.insert(name, builder);
    }

    pub async fn get(&self, name: &str) -> Result<Arc<dyn Builder>> {
        self.inner
            .read()
            .await
            .builders
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownBuilder(name.to_string()))
    }

    /// Get the configured default builder.
    pub async fn get_default(&self) -> Result<Arc<dyn Builder>> {
        let inner = self.inner.read().await;
        inner
            .builders
            .get(&inner.default_builder)
            .cloned()
            .ok_or_else(|| Error::UnknownBuilder(inner.default_builder.clone()))
    }

    pub async fn default_name(&self) -> String {
        self.inner.read().await.default_builder.clone()
    }

    pub async fn set_default(&self, name: impl Into<String>) {
        self.inner.write().await.default_builder = name.into();
    }

    /// Snapshot of every registered builder, ordered by name.
    pub async fn registry(&self) -> BTreeMap<String, Arc<dyn Builder>> {
        self.inner.read().await.builders.clone()
    }

    /// Drop every registration. The default name is kept.
    pub async fn reset(&self) {
        self.inner.write().await.builders.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.builders.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.builders.is_empty()
    }

    /// Add a platform on every registered builder.
    pub async fn platform_add(&self, opts: &PlatformOptions) -> Result<()> {
        self.multicast(Dispatch::Add(opts)).await
    }

    /// Update a platform on every registered builder.
    pub async fn platform_update(&self, opts: &PlatformOptions) -> Result<()> {
        self.multicast(Dispatch::Update(opts)).await
    }

    /// Remove a platform from every registered builder.
    pub async fn platform_remove(&self, name: &str) -> Result<()> {
        self.multicast(Dispatch::Remove(name)).await
    }

    /// Send `dispatch` to each builder in name order, stopping at the first
    /// error. The lock is released before any backend is awaited.
    async fn multicast(&self, dispatch: Dispatch<'_>) -> Result<()> {
        let builders = self.registry().await;
        let operation = dispatch.operation();

        for (name, builder) in builders {
            debug!(
                builder = %name,
                platform = %dispatch.platform(),
                %operation,
                "Dispatching to builder"
            );

            let result = match dispatch {
                Dispatch::Add(opts) => builder.platform_add(opts).await,
                Dispatch::Update(opts) => builder.platform_update(opts).await,
                Dispatch::Remove(platform) => builder.platform_remove(platform).await,
            };

            if let Err(e) = result {
                warn!(
                    builder = %name,
                    platform = %dispatch.platform(),
                    %operation,
                    error = %e,
                    "Builder failed"
                );
                return Err(e.into());
            }
        }

        Ok(())
    }
}
