//! KDL configuration parsing for Plinth.
//!
//! This crate handles parsing of the system configuration: the database
//! location, the declared builder backends and which of them is the default.

pub mod error;
pub mod system;

pub use error::{ConfigError, ConfigResult};
pub use system::{BuilderConfig, PoolConfig, SystemConfig, load_system_config, parse_system_config};
