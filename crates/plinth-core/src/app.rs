//! Application records as seen from the platform side.
//!
//! Applications are owned by the deployment pipeline; this crate only reads
//! which platform they build on and flips their rebuild marker.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    pub name: String,
    /// Name of the platform this app builds on.
    pub platform: String,
    /// Set when the platform received new build content the app has not
    /// been rebuilt against yet.
    #[serde(default)]
    pub update_platform: bool,
}

impl App {
    pub fn new(name: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            platform: platform.into(),
            update_platform: false,
        }
    }
}
