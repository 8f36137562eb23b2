//! Builder registry and backends for Plinth.
//!
//! Provides:
//! - The registry that holds every configured builder and dispatches
//!   platform lifecycle operations to all of them
//! - A recording fake builder for tests and local development

pub mod fake;
pub mod registry;

pub use fake::{FakeBuilder, FakeCall};
pub use plinth_core::builder::{
    BuildRequest, Builder, BuilderError, PlatformOperation, PlatformOptions,
};
pub use registry::BuilderRegistry;
