//! Cluster-side job states and their mapping onto the service's domain
//! status enum (`pending|running|complete|failed|cancelled`).

use serde::{Deserialize, Serialize};

/// The `state.current` string a status poll returns, as a closed set of
/// the values the cluster manager is documented to emit. Anything the
/// manager reports outside this set still deserializes (`Other`) so a
/// single unrecognized string from the cluster never breaks a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClusterJobState {
    Pending,
    Running,
    Completed,
    Failed,
    Timeout,
    #[serde(rename = "OUT_OF_MEMORY")]
    OutOfMemory,
    Cancelled,
    #[serde(other)]
    Other,
}

/// The domain status the job tracker persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Complete,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Complete => "complete",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ClusterJobState> for JobStatus {
    /// `PENDING→pending`, `RUNNING→running`, `COMPLETED→complete`,
    /// `FAILED|TIMEOUT|OUT_OF_MEMORY→failed`, `CANCELLED→cancelled`;
    /// anything else maps to `failed`.
    fn from(state: ClusterJobState) -> Self {
        match state {
            ClusterJobState::Pending => JobStatus::Pending,
            ClusterJobState::Running => JobStatus::Running,
            ClusterJobState::Completed => JobStatus::Complete,
            ClusterJobState::Failed | ClusterJobState::Timeout | ClusterJobState::OutOfMemory => {
                JobStatus::Failed
            }
            ClusterJobState::Cancelled => JobStatus::Cancelled,
            ClusterJobState::Other => JobStatus::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_states() {
        assert_eq!(JobStatus::from(ClusterJobState::Running), JobStatus::Running);
        assert_eq!(JobStatus::from(ClusterJobState::Completed), JobStatus::Complete);
        assert_eq!(JobStatus::from(ClusterJobState::Timeout), JobStatus::Failed);
        assert_eq!(JobStatus::from(ClusterJobState::OutOfMemory), JobStatus::Failed);
        assert_eq!(JobStatus::from(ClusterJobState::Cancelled), JobStatus::Cancelled);
    }

    #[test]
    fn unknown_state_deserializes_as_other_and_maps_to_failed() {
        let state: ClusterJobState = serde_json::from_str("\"SUSPENDED\"").unwrap();
        assert_eq!(state, ClusterJobState::Other);
        assert_eq!(JobStatus::from(state), JobStatus::Failed);
    }
}
