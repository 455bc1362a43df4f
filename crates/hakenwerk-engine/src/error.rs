use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Serializing a normalized condition into its index key failed.
    #[error("condition key serialization failed: {0}")]
    Key(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
