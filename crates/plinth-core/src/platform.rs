//! Platform records.

use serde::{Deserialize, Serialize};

/// A named base build template that applications build upon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    /// Unique, non-empty name. Primary key.
    pub name: String,
    /// Disabled platforms are hidden from enabled-only listings.
    #[serde(default)]
    pub disabled: bool,
}

impl Platform {
    /// Create an enabled platform.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            disabled: false,
        }
    }

    pub fn disabled(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            disabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_defaults_to_false() {
        let platform: Platform = serde_json::from_str(r#"{"name": "python"}"#).unwrap();
        assert_eq!(platform, Platform::new("python"));
    }
}
