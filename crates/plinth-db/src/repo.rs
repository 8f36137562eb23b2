//! Repository traits and implementations.

pub mod app;
pub mod memory;
pub mod platform;

pub use app::{AppRepo, PgAppRepo};
pub use memory::{MemoryAppRepo, MemoryPlatformRepo};
pub use platform::{PgPlatformRepo, PlatformFilter, PlatformRepo};
