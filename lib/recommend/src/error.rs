use sugang_schema::SchemaError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecommendError>;

#[derive(Error, Debug)]
pub enum RecommendError {
    #[error(transparent)]
    Core(#[from] sugang_core::Error),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Pool not found: {0}")]
    PoolNotFound(String),

    #[error("No quota configured for pool '{0}'")]
    MissingQuota(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
