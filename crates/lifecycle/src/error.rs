use bidwork_core::error::{CoreError, ErrorKind};

/// Errors returned by the lifecycle services and stores.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// A domain rule rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The Postgres store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

impl LifecycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LifecycleError::Core(err) => err.kind(),
            LifecycleError::Storage(_) => ErrorKind::Internal,
        }
    }

    /// The domain error, if this is one.
    pub fn as_core(&self) -> Option<&CoreError> {
        match self {
            LifecycleError::Core(err) => Some(err),
            LifecycleError::Storage(_) => None,
        }
    }
}
