//! Store-level error types.

/// Error type for all `dm-store` operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not found")]
    NotFound,

    #[error("permission")]
    Permission,

    #[error("does not have access")]
    NoAccess,

    #[error("no associated user")]
    NoAssociatedUser,

    #[error("cannot be empty: {0}")]
    CannotBeEmpty(&'static str),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Generic(String),
}

impl Error {
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
