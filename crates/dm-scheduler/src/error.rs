//! Error type for the cluster scheduler adapter.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("auth token not provided")]
    AuthTokenNotProvided,

    #[error("submission failed with status: {0}")]
    SubmissionFailed(u16),

    #[error("cancel failed with status: {0}")]
    CancelFailed(u16),

    #[error("missing job_id")]
    MissingJobId,

    #[error("job status not found")]
    JobStatusNotFound,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url error: {0}")]
    Url(#[from] url::ParseError),

    #[error("core error: {0}")]
    Core(#[from] dm_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
