use thiserror::Error;

/// A bounded domain value was outside its documented range. The only
/// user-recoverable error in the core.
#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("alpha must lie in the open interval (0, 1), got {0}")]
    Alpha(f64),
    #[error("score must lie in [0, 1], got {0}")]
    Score(f64),
    #[error("cost must be non-negative, got {0}")]
    Cost(f64),
    #[error("specificity must be non-negative, got {0}")]
    Specificity(f64),
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// Computing a hook's condition index key failed.
    #[error(transparent)]
    Key(#[from] hakenwerk_engine::EngineError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
