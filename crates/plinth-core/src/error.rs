//! Error types for Plinth.

use thiserror::Error;

use crate::builder::BuilderError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("platform name is required")]
    PlatformNameMissing,

    #[error("platform not found")]
    PlatformNotFound,

    #[error("duplicate platform")]
    DuplicatePlatform,

    #[error("invalid platform")]
    InvalidPlatform,

    #[error("platform {name:?} is in use by {apps} app(s)")]
    PlatformInUse { name: String, apps: u64 },

    #[error("unknown builder: {0:?}")]
    UnknownBuilder(String),

    /// Failure reported by a builder backend, passed through untouched.
    #[error(transparent)]
    Builder(#[from] BuilderError),

    #[error("store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, Error>;
