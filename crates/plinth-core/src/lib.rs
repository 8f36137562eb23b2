//! Core domain types and traits for Plinth platform management.
//!
//! This crate contains:
//! - Platform and application records
//! - Builder trait and platform request types
//! - Error taxonomy shared by every layer

pub mod app;
pub mod builder;
pub mod error;
pub mod platform;

pub use app::App;
pub use builder::{BuildRequest, Builder, BuilderError, PlatformOperation, PlatformOptions};
pub use error::{Error, Result};
pub use platform::Platform;
