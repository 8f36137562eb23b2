//! Platform management service for Plinth.
//!
//! Keeps the persisted platform records consistent with every registered
//! builder backend and flags dependent applications for rebuild when a
//! platform receives new build content.

pub mod connect;
pub mod platform;

pub use connect::{ConnectError, connect};
pub use platform::PlatformService;
