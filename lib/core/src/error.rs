use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema mismatch: user vector has {expected} dimensions, candidate '{lecture}' has {actual}")]
    SchemaMismatch {
        lecture: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid lecture row: {0}")]
    InvalidRow(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
