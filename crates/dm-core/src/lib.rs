//! Session, token, dataset, job, conversation and visualization trackers
//! for the datamonkey orchestration service.
//!
//! Each tracker wraps a [`dm_store::Database`] handle and translates
//! `dm_store::Error` into this crate's [`Error`], the single error type
//! the rest of the service matches on.

pub mod config;
pub mod conversation;
pub mod dataset;
pub mod error;
pub mod job;
pub mod session;
pub mod token;
pub mod visualization;

pub use config::{AppConfig, DatasetConfig, SessionConfig, TokenConfig};
pub use conversation::ConversationTracker;
pub use dataset::{DatasetTracker, NewDataset};
pub use error::{Error, Result};
pub use job::{JobTracker, JobTrackerBackend, MemoryJobBackend};
pub use session::SessionTracker;
pub use token::{AuthOutcome, Claims, OwnerLookup, TokenService, TokenSources};
pub use visualization::{NewVisualization, VisualizationTracker};
