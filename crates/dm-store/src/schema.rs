//! Database schema definitions and constants.

// Current schema version
pub const SCHEMA_VERSION: u32 = 1;

// Table names
pub const TABLE_SCHEMA_MIGRATIONS: &str = "schema_migrations";
pub const TABLE_SESSIONS: &str = "sessions";
pub const TABLE_DATASETS: &str = "datasets";
pub const TABLE_JOBS: &str = "jobs";
pub const TABLE_CONVERSATIONS: &str = "conversations";
pub const TABLE_MESSAGES: &str = "messages";
pub const TABLE_VISUALIZATIONS: &str = "visualizations";

// Column names for the sessions table
pub mod sessions {
    pub const SUBJECT: &str = "subject";
    pub const CREATED_AT: &str = "created_at";
    pub const LAST_SEEN: &str = "last_seen";
}

// Column names for the datasets table
pub mod datasets {
    pub const ID: &str = "id";
    pub const USER_ID: &str = "user_id";
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const DESCRIPTION: &str = "description";
    pub const CONTENT_HASH: &str = "content_hash";
    pub const DATA_JSON: &str = "data_json";
    pub const CREATED: &str = "created";
    pub const UPDATED: &str = "updated";

    /// Columns `UpdateByUser` is allowed to touch. Unknown keys are ignored.
    pub const UPDATABLE: &[&str] = &[NAME, TYPE, DESCRIPTION];
}

// Column names for the jobs table
pub mod jobs {
    pub const JOB_ID: &str = "job_id";
    pub const SCHEDULER_JOB_ID: &str = "scheduler_job_id";
    pub const USER_ID: &str = "user_id";
    pub const ALIGNMENT_ID: &str = "alignment_id";
    pub const TREE_ID: &str = "tree_id";
    pub const METHOD_TYPE: &str = "method_type";
    pub const STATUS: &str = "status";
    pub const CREATED_AT: &str = "created_at";
    pub const UPDATED_AT: &str = "updated_at";

    /// Whitelisted filter columns for `ListJobsWithFilters`. Any filter key
    /// outside this set is dropped before the query is built, never bound.
    pub const FILTERABLE: &[&str] = &[USER_ID, ALIGNMENT_ID, TREE_ID, METHOD_TYPE, STATUS];
}

// Column names for the conversations table
pub mod conversations {
    pub const ID: &str = "id";
    pub const USER_ID: &str = "user_id";
    pub const TITLE: &str = "title";
    pub const CREATED: &str = "created";
    pub const UPDATED: &str = "updated";
}

// Column names for the messages table
pub mod messages {
    pub const ID: &str = "id";
    pub const CONVERSATION_ID: &str = "conversation_id";
    pub const ROLE: &str = "role";
    pub const CONTENT: &str = "content";
    pub const TIMESTAMP: &str = "timestamp";
}

// Column names for the visualizations table
pub mod visualizations {
    pub const VIZ_ID: &str = "viz_id";
    pub const USER_ID: &str = "user_id";
    pub const JOB_ID: &str = "job_id";
    pub const DATASET_ID: &str = "dataset_id";
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const SPEC: &str = "spec";
    pub const METADATA: &str = "metadata";
    pub const CREATED: &str = "created";
    pub const UPDATED: &str = "updated";

    pub const UPDATABLE: &[&str] = &[TITLE, DESCRIPTION, SPEC, METADATA];
}
