//! Cluster scheduler adapter: submit/status/cancel against an external
//! REST API, plus the credential lifecycle that feeds it a signed token.

pub mod auth;
pub mod client;
pub mod error;

pub use auth::SchedulerAuth;
pub use client::{SchedulerClient, SchedulerConfig};
pub use error::{Error, Result};
