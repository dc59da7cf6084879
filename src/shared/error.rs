use thiserror::Error;

/// Crate-wide error taxonomy. Store and network failures are converted into
/// these variants at the component boundary; nothing else crosses into the
/// caller.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("local store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Short message suitable for user display. Full detail goes to the logs.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
                AppError::StoreUnavailable(err.to_string())
            }
            other => AppError::Database(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
