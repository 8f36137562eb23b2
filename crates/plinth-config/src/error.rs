//! Configuration parsing errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid KDL in system config: {0}")]
    Parse(#[from] kdl::KdlError),

    #[error("system config is missing {0}")]
    MissingField(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("builder {0:?} is declared more than once")]
    DuplicateBuilder(String),

    #[error("default builder {0:?} is not declared")]
    UnknownDefaultBuilder(String),

    #[error("cannot read system config: {0}")]
    Io(#[from] std::io::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
