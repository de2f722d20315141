//! Error types for arm daemon operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ArmError>;

#[derive(Error, Debug)]
pub enum ArmError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
