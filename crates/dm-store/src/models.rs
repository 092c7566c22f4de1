//! Record types shared by every store in this crate.

use serde::{Deserialize, Serialize};

/// A session row: an anonymous, unguessable subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub subject: String,
    pub created_at: i64,
    pub last_seen: i64,
}

/// A dataset row. `user_id` is `None` for rows with no owner, which are only
/// reachable through internal (non-`ByUser`) paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub r#type: String,
    pub description: String,
    pub content_hash: String,
    pub data_json: Option<String>,
    pub created: String,
    pub updated: String,
}

/// A job row, encoding both the scheduler mapping and analysis metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: String,
    pub scheduler_job_id: String,
    pub user_id: Option<String>,
    pub alignment_id: Option<String>,
    pub tree_id: Option<String>,
    pub method_type: String,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Lightweight projection returned by `ListJobsByStatus`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobInfo {
    pub job_id: String,
    pub user_id: Option<String>,
    pub status: String,
}

/// The `(alignmentId, treeId, methodType, status)` tuple returned by
/// `GetJobMetadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMetadata {
    pub alignment_id: Option<String>,
    pub tree_id: Option<String>,
    pub method_type: String,
    pub status: String,
}

/// A conversation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: String,
    pub user_id: Option<String>,
    pub title: String,
    pub created: String,
    pub updated: String,
}

/// A single message within a conversation, ordered by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: i64,
    pub conversation_id: String,
    pub role: String,
    pub content: String,
    pub timestamp: String,
}

/// A stored visualization specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationRecord {
    pub viz_id: String,
    pub user_id: Option<String>,
    pub job_id: Option<String>,
    pub dataset_id: Option<String>,
    pub title: String,
    pub description: String,
    pub spec: String,
    pub metadata: Option<String>,
    pub created: String,
    pub updated: String,
}
