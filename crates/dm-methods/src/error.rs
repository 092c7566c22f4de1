//! Error type for the method catalog.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown method type")]
    UnknownMethodType,

    #[error("invalid dataset type")]
    InvalidDatasetType,

    #[error("name is required")]
    NameRequired,

    #[error("type is required")]
    TypeRequired,

    #[error("content cannot be empty")]
    ContentEmpty,

    #[error("resample value must be non-negative")]
    NegativeResample,

    #[error("rates must be non-negative")]
    NegativeRates,

    #[error("syn-rates must be non-negative")]
    NegativeSynRates,

    #[error("request is required")]
    NilRequest,

    #[error("parse error: {0}")]
    Parse(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
