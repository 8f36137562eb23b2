//! Recording fake builder.
//!
//! Records every platform call it receives and can be told to fail the next
//! call of a given operation. Used by tests across the workspace and handy as
//! a stand-in backend during local development.

use async_trait::async_trait;
use plinth_core::builder::{
    BuildRequest, Builder, BuilderError, PlatformOperation, PlatformOptions,
};
use std::collections::{BTreeSet, HashMap, VecDeque};
use tokio::sync::Mutex;

/// A platform call received by a [`FakeBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeCall {
    pub operation: PlatformOperation,
    pub platform: String,
    /// Whether the request carried new build content.
    pub new_content: bool,
}

#[derive(Default)]
struct FakeState {
    calls: Vec<FakeCall>,
    builds: Vec<String>,
    failures: HashMap<PlatformOperation, VecDeque<BuilderError>>,
    platforms: BTreeSet<String>,
}

#[derive(Default)]
pub struct FakeBuilder {
    state: Mutex<FakeState>,
    strict: bool,
}

impl FakeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fake that rejects updates and removals of platforms it never added.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    /// Make the next `operation` call fail with `error`. Failures queue up
    /// and are consumed one per call.
    pub async fn prepare_failure(&self, operation: PlatformOperation, error: BuilderError) {
        self.state
            .lock()
            .await
            .failures
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Forget recorded calls, builds, pending failures and known platforms.
    pub async fn reset(&self) {
        *self.state.lock().await = FakeState::default();
    }

    pub async fn calls(&self) -> Vec<FakeCall> {
        self.state.lock().await.calls.clone()
    }

    pub async fn call_count(&self, operation: PlatformOperation) -> usize {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    /// Apps built through this fake, in call order.
    pub async fn builds(&self) -> Vec<String> {
        self.state.lock().await.builds.clone()
    }

    pub async fn has_platform(&self, name: &str) -> bool {
        self.state.lock().await.platforms.contains(name)
    }

    async fn record(
        &self,
        operation: PlatformOperation,
        platform: &str,
        new_content: bool,
    ) -> Result<(), BuilderError> {
        let mut state = self.state.lock().await;
        state.calls.push(FakeCall {
            operation,
            platform: platform.to_string(),
            new_content,
        });

        if let Some(err) = state
            .failures
            .get_mut(&operation)
            .and_then(|queue| queue.pop_front())
        {
            return Err(err);
        }

        match operation {
            PlatformOperation::Add => {
                state.platforms.insert(platform.to_string());
            }
            PlatformOperation::Update => {
                if self.strict && !state.platforms.contains(platform) {
                    return Err(BuilderError::new(format!("platform {platform:?} not found")));
                }
            }
            PlatformOperation::Remove => {
                if !state.platforms.remove(platform) && self.strict {
                    return Err(BuilderError::new(format!("platform {platform:?} not found")));
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Builder for FakeBuilder {
    async fn platform_add(&self, opts: &PlatformOptions) -> Result<(), BuilderError> {
        self.record(PlatformOperation::Add, &opts.name, opts.has_new_build_content())
            .await
    }

    async fn platform_update(&self, opts: &PlatformOptions) -> Result<(), BuilderError> {
        self.record(
            PlatformOperation::Update,
            &opts.name,
            opts.has_new_build_content(),
        )
        .await
    }

    async fn platform_remove(&self, name: &str) -> Result<(), BuilderError> {
        self.record(PlatformOperation::Remove, name, false).await
    }

    async fn build(&self, req: BuildRequest) -> Result<String, BuilderError> {
        let mut state = self.state.lock().await;
        if self.strict && !state.platforms.contains(&req.platform) {
            return Err(BuilderError::new(format!(
                "platform {:?} not found",
                req.platform
            )));
        }
        state.builds.push(req.app.clone());
        Ok(format!("fake/app-{}:v{}", req.app, state.builds.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_calls() {
        let fake = FakeBuilder::new();
        let opts =
            PlatformOptions::new("python").with_arg("dockerfile", "http://localhost/Dockerfile");
        fake.platform_add(&opts).await.unwrap();
        fake.platform_remove("python").await.unwrap();

        assert_eq!(
            fake.calls().await,
            vec![
                FakeCall {
                    operation: PlatformOperation::Add,
                    platform: "python".to_string(),
                    new_content: true,
                },
                FakeCall {
                    operation: PlatformOperation::Remove,
                    platform: "python".to_string(),
                    new_content: false,
                },
            ]
        );
        assert!(!fake.has_platform("python").await);
    }

    #[tokio::test]
    async fn test_prepared_failure_is_consumed_once() {
        let fake = FakeBuilder::new();
        fake.prepare_failure(PlatformOperation::Add, BuilderError::new("boom"))
            .await;

        let opts = PlatformOptions::new("python");
        let err = fake.platform_add(&opts).await.unwrap_err();
        assert_eq!(err.message(), "boom");
        assert!(!fake.has_platform("python").await);

        fake.platform_add(&opts).await.unwrap();
        assert!(fake.has_platform("python").await);
        assert_eq!(fake.call_count(PlatformOperation::Add).await, 2);
    }

    #[tokio::test]
    async fn test_reset() {
        let fake = FakeBuilder::new();
        fake.prepare_failure(PlatformOperation::Remove, BuilderError::new("boom"))
            .await;
        fake.platform_add(&PlatformOptions::new("python")).await.unwrap();

        fake.reset().await;
        assert!(fake.calls().await.is_empty());
        assert!(!fake.has_platform("python").await);
        fake.platform_remove("python").await.unwrap();
    }

    #[tokio::test]
    async fn test_strict_rejects_unknown_platform() {
        let fake = FakeBuilder::strict();
        let opts = PlatformOptions::new("python");

        let err = fake.platform_update(&opts).await.unwrap_err();
        assert_eq!(err.message(), r#"platform "python" not found"#);

        fake.platform_add(&opts).await.unwrap();
        fake.platform_update(&opts).await.unwrap();

        let image = fake
            .build(BuildRequest {
                app: "myapp".to_string(),
                platform: "python".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(image, "fake/app-myapp:v1");
        assert_eq!(fake.builds().await, vec!["myapp".to_string()]);

        fake.platform_remove("python").await.unwrap();
        assert!(fake.platform_remove("python").await.is_err());
    }
}
