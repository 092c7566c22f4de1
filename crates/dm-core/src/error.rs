//! Core error types, shared by every tracker and the token service.
//!
//! Error *kinds* are stable public contracts (§7 of the design): callers
//! match on the variant, and the `Display` string for each matches the
//! stable strings tests assert on.

/// Error type for all `dm-core` operations.
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

    #[error("no token provided")]
    NoTokenProvided,

    #[error("invalid token")]
    InvalidToken,

    #[error("missing subject claim")]
    MissingSubjectClaim,

    #[error("session tracker not available")]
    SessionTrackerNotAvailable,

    #[error("{0} is required")]
    FieldRequired(&'static str),

    #[error("content cannot be empty")]
    ContentEmpty,

    #[error("store error: {0}")]
    Store(#[from] dm_store::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("{0}")]
    Generic(String),
}

impl Error {
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Narrows a store error onto the core ownership/not-found kinds so
    /// every tracker surfaces one consistent error enum.
    pub(crate) fn from_store(err: dm_store::Error) -> Self {
        match err {
            dm_store::Error::NotFound => Error::NotFound,
            dm_store::Error::Permission => Error::Permission,
            dm_store::Error::NoAccess => Error::NoAccess,
            dm_store::Error::NoAssociatedUser => Error::NoAssociatedUser,
            dm_store::Error::CannotBeEmpty(field) => Error::CannotBeEmpty(field),
            other => Error::Store(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
