//! Builder trait and platform request types.
//!
//! Builders turn a platform definition into a deployable artifact (an image
//! in a registry, a cached base layer, ...). Every backend is driven through
//! the same [`Builder`] trait so several of them can be kept in sync.

use async_trait::async_trait;
use bytes::Bytes;
use derive_more::Display;
use std::collections::HashMap;
use thiserror::Error;

/// Argument holding the URL of the build file.
pub const DOCKERFILE_ARG: &str = "dockerfile";
/// Argument holding the requested disabled state.
pub const DISABLED_ARG: &str = "disabled";

/// Request payload for platform add and update.
#[derive(Debug, Clone, Default)]
pub struct PlatformOptions {
    /// Platform name.
    pub name: String,
    /// Free-form arguments. Recognized keys are `dockerfile` and `disabled`.
    pub args: HashMap<String, String>,
    /// Raw build-file content uploaded with the request.
    pub input: Option<Bytes>,
}

impl PlatformOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    pub fn with_input(mut self, input: impl Into<Bytes>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Build-file URL, if a non-empty one was given.
    pub fn dockerfile(&self) -> Option<&str> {
        self.args
            .get(DOCKERFILE_ARG)
            .map(String::as_str)
            .filter(|url| !url.is_empty())
    }

    /// Requested disabled state.
    ///
    /// `Ok(None)` when the argument is absent or empty, `Err` carrying the raw
    /// value when it is not a boolean literal.
    pub fn disabled(&self) -> std::result::Result<Option<bool>, String> {
        match self.args.get(DISABLED_ARG).map(String::as_str) {
            None | Some("") => Ok(None),
            Some("1" | "t" | "T" | "TRUE" | "true" | "True") => Ok(Some(true)),
            Some("0" | "f" | "F" | "FALSE" | "false" | "False") => Ok(Some(false)),
            Some(other) => Err(other.to_string()),
        }
    }

    /// Whether the request carries a new build file, either by URL or as an
    /// upload. An empty upload still counts.
    pub fn has_new_build_content(&self) -> bool {
        self.dockerfile().is_some() || self.input.is_some()
    }
}

/// Request to build an application image on top of its platform.
#[derive(Debug, Clone, Default)]
pub struct BuildRequest {
    /// Application being built.
    pub app: String,
    /// Platform the application builds on.
    pub platform: String,
    /// URL of a source archive to build from.
    pub archive_url: Option<String>,
    /// Prebuilt image to promote instead of building.
    pub image: Option<String>,
    /// Uploaded source archive.
    pub input: Option<Bytes>,
}

/// Platform lifecycle operation, used for logging and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum PlatformOperation {
    #[display("platform-add")]
    Add,
    #[display("platform-update")]
    Update,
    #[display("platform-remove")]
    Remove,
}

/// Failure reported by a builder backend.
///
/// The message is kept exactly as the backend produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BuilderError {
    message: String,
}

impl BuilderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Trait for builder backends.
#[async_trait]
pub trait Builder: Send + Sync {
    /// Create the artifact for a new platform.
    async fn platform_add(&self, opts: &PlatformOptions) -> std::result::Result<(), BuilderError>;

    /// Rebuild or reconfigure the artifact of an existing platform.
    async fn platform_update(
        &self,
        opts: &PlatformOptions,
    ) -> std::result::Result<(), BuilderError>;

    /// Remove the artifact of a platform.
    async fn platform_remove(&self, name: &str) -> std::result::Result<(), BuilderError>;

    /// Build an application image, returning the image name.
    async fn build(&self, req: BuildRequest) -> std::result::Result<String, BuilderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_parsing() {
        let opts = PlatformOptions::new("python");
        assert_eq!(opts.disabled(), Ok(None));

        let opts = opts.with_arg(DISABLED_ARG, "");
        assert_eq!(opts.disabled(), Ok(None));

        let opts = opts.with_arg(DISABLED_ARG, "true");
        assert_eq!(opts.disabled(), Ok(Some(true)));

        let opts = opts.with_arg(DISABLED_ARG, "F");
        assert_eq!(opts.disabled(), Ok(Some(false)));

        let opts = opts.with_arg(DISABLED_ARG, "yes");
        assert_eq!(opts.disabled(), Err("yes".to_string()));
    }

    #[test]
    fn test_has_new_build_content() {
        let opts = PlatformOptions::new("python");
        assert!(!opts.has_new_build_content());

        let opts = opts.with_arg(DOCKERFILE_ARG, "");
        assert!(!opts.has_new_build_content());
        assert_eq!(opts.dockerfile(), None);

        let with_url = opts
            .clone()
            .with_arg(DOCKERFILE_ARG, "http://localhost/Dockerfile");
        assert!(with_url.has_new_build_content());
        assert_eq!(with_url.dockerfile(), Some("http://localhost/Dockerfile"));

        let with_empty_upload = opts.with_input(Bytes::new());
        assert!(with_empty_upload.has_new_build_content());
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(PlatformOperation::Add.to_string(), "platform-add");
        assert_eq!(PlatformOperation::Remove.to_string(), "platform-remove");
    }
}
