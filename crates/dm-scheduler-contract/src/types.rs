//! JSON envelopes exchanged with the cluster scheduler REST API.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::status::ClusterJobState;

/// `POST <submit_api_path>/job/submit` request body: one task on one node,
/// stdout/stderr redirected to the job's log path, and a shell script body
/// equal to the command line the method catalog produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSubmitRequest {
    pub job: JobDescriptor,
    pub script: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub name: String,
    pub ntasks: u32,
    pub nodes: u32,
    pub current_working_directory: String,
    pub standard_input: String,
    pub standard_output: String,
    pub standard_error: String,
    pub environment: HashMap<String, String>,
}

impl JobDescriptor {
    /// A single task on a single node, logs redirected to `log_path`, and a
    /// minimal environment of just `PATH`/`LD_LIBRARY_PATH` as the wire
    /// protocol documents.
    pub fn single_task(job_id: &str, log_path: &str, path: &str, ld_library_path: &str) -> Self {
        let mut environment = HashMap::new();
        environment.insert("PATH".to_string(), path.to_string());
        environment.insert("LD_LIBRARY_PATH".to_string(), ld_library_path.to_string());
        Self {
            name: job_id.to_string(),
            ntasks: 1,
            nodes: 1,
            current_working_directory: "/root".to_string(),
            standard_input: "/dev/null".to_string(),
            standard_output: log_path.to_string(),
            standard_error: log_path.to_string(),
            environment,
        }
    }
}

/// Submit response: a JSON object containing `job_id`. The cluster manager
/// is free to emit it as a bare number or a string; either deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSubmitResponse {
    #[serde(deserialize_with = "deserialize_job_id", default)]
    pub job_id: Option<String>,
}

fn deserialize_job_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(serde_json::Number),
        Null,
    }
    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Str(s)) => Some(s),
        Some(Raw::Num(n)) => Some(n.to_string()),
        Some(Raw::Null) | None => None,
    })
}

/// `GET <api_path>/job/{schedulerJobId}` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub jobs: Vec<JobStatusEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusEntry {
    pub name: String,
    pub state: JobStateInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStateInfo {
    pub current: ClusterJobState,
}
