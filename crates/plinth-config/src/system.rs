//! System configuration parsing.

use crate::{ConfigError, ConfigResult};
use kdl::{KdlDocument, KdlNode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// System-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Connection pool settings.
    pub pool: PoolConfig,
    /// Builder used when no specific backend is named.
    pub default_builder: String,
    /// Declared builder backends, in declaration order.
    pub builders: Vec<BuilderConfig>,
}

/// Database connection pool settings, from the `database-pool` node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    /// Seconds to wait for a free connection.
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 0,
            acquire_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuilderConfig {
    pub name: String,
    /// Backend kind, e.g. `docker`.
    pub kind: String,
    /// Backend-specific settings.
    pub options: HashMap<String, String>,
}

impl SystemConfig {
    pub fn builder(&self, name: &str) -> Option<&BuilderConfig> {
        self.builders.iter().find(|b| b.name == name)
    }
}

/// Read and parse the system configuration file at `path`.
pub fn load_system_config(path: impl AsRef<Path>) -> ConfigResult<SystemConfig> {
    let text = std::fs::read_to_string(path)?;
    parse_system_config(&text)
}

/// Parse system configuration from KDL text.
pub fn parse_system_config(kdl: &str) -> ConfigResult<SystemConfig> {
    let doc: KdlDocument = kdl.parse()?;

    let mut database_url = None;
    let mut pool = PoolConfig::default();
    let mut default_builder = None;
    let mut builders: Vec<BuilderConfig> = Vec::new();

    for node in doc.nodes() {
        match node.name().value() {
            "database-url" => {
                database_url = Some(
                    get_first_string_arg(node)
                        .ok_or_else(|| ConfigError::MissingField("database-url".to_string()))?,
                );
            }
            "database-pool" => {
                pool = parse_pool(node)?;
            }
            "default-builder" => {
                default_builder = Some(
                    get_first_string_arg(node)
                        .ok_or_else(|| ConfigError::MissingField("default-builder".to_string()))?,
                );
            }
            "builder" => {
                let builder = parse_builder(node)?;
                if builders.iter().any(|b| b.name == builder.name) {
                    return Err(ConfigError::DuplicateBuilder(builder.name));
                }
                builders.push(builder);
            }
            _ => {} // Ignore unknown nodes
        }
    }

    let default_builder = match default_builder {
        Some(name) => {
            if !builders.iter().any(|b| b.name == name) {
                return Err(ConfigError::UnknownDefaultBuilder(name));
            }
            name
        }
        None if builders.len() == 1 => builders[0].name.clone(),
        None => return Err(ConfigError::MissingField("default-builder".to_string())),
    };

    Ok(SystemConfig {
        database_url,
        pool,
        default_builder,
        builders,
    })
}

fn parse_builder(node: &KdlNode) -> ConfigResult<BuilderConfig> {
    let name = get_first_string_arg(node)
        .ok_or_else(|| ConfigError::MissingField("builder name".to_string()))?;
    if name.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "builder name".to_string(),
            message: "must not be empty".to_string(),
        });
    }

    let kind = get_string_prop(node, "type")
        .ok_or_else(|| ConfigError::MissingField(format!("type for builder '{}'", name)))?;

    let mut options = HashMap::new();
    if let Some(children) = node.children() {
        for child in children.nodes() {
            let key = child.name().value().to_string();
            if let Some(val) = get_first_string_arg(child) {
                options.insert(key, val);
            }
        }
    }

    Ok(BuilderConfig {
        name,
        kind,
        options,
    })
}

fn parse_pool(node: &KdlNode) -> ConfigResult<PoolConfig> {
    let defaults = PoolConfig::default();
    let pool = PoolConfig {
        max_connections: get_integer_prop(node, "max-connections")?
            .unwrap_or(defaults.max_connections),
        min_connections: get_integer_prop(node, "min-connections")?
            .unwrap_or(defaults.min_connections),
        acquire_timeout_secs: get_integer_prop(node, "acquire-timeout-secs")?
            .unwrap_or(defaults.acquire_timeout_secs),
    };

    if pool.max_connections == 0 {
        return Err(ConfigError::InvalidValue {
            field: "database-pool max-connections".to_string(),
            message: "must be at least 1".to_string(),
        });
    }
    if pool.min_connections > pool.max_connections {
        return Err(ConfigError::InvalidValue {
            field: "database-pool min-connections".to_string(),
            message: format!("exceeds max-connections ({})", pool.max_connections),
        });
    }
    Ok(pool)
}

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn get_string_prop(node: &KdlNode, name: &str) -> Option<String> {
    node.get(name)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}

fn get_integer_prop<T: TryFrom<i128>>(node: &KdlNode, name: &str) -> ConfigResult<Option<T>> {
    let Some(value) = node.get(name) else {
        return Ok(None);
    };
    let invalid = |message: &str| ConfigError::InvalidValue {
        field: format!("{} {}", node.name().value(), name),
        message: message.to_string(),
    };
    let n = value
        .as_integer()
        .ok_or_else(|| invalid("expected an integer"))?;
    T::try_from(n)
        .map(Some)
        .map_err(|_| invalid("out of range"))
}
