//! Embedded SQLite store for datasets, jobs, sessions, conversations and
//! visualizations.
//!
//! One [`Database`] handle wraps a single `rusqlite::Connection` behind a
//! mutex; every other component receives that handle rather than a path so
//! the process runs one connection with consistent PRAGMA state.

pub mod connection;
pub mod conversations;
pub mod datasets;
pub mod error;
pub mod jobs;
pub mod migrations;
pub mod models;
mod ownership;
pub mod schema;
pub mod sessions;
pub mod visualizations;

pub use connection::Database;
pub use conversations::ConversationStore;
pub use datasets::DatasetStore;
pub use error::{Error, Result};
pub use jobs::JobStore;
pub use models::{
    ConversationRecord, DatasetRecord, JobInfo, JobMetadata, JobRecord, MessageRecord,
    SessionRecord, VisualizationRecord,
};
pub use sessions::SessionStore;
pub use visualizations::VisualizationStore;
