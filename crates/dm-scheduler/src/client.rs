//! HTTP client for the cluster REST API: submit, status, cancel.

use std::sync::Arc;

use dm_core::JobTrackerBackend;
use dm_scheduler_contract::{
    JobDescriptor, JobStatus, JobStatusResponse, JobSubmitRequest, JobSubmitResponse,
};
use url::Url;

use crate::auth::SchedulerAuth;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub base_url: Url,
    pub api_path: String,
    pub submit_api_path: String,
    pub queue_name: String,
}

/// `X-SLURM-USER-TOKEN`-authenticated client for the cluster scheduler
/// REST API. Owns no retry logic: network errors and non-2xx responses
/// surface verbatim, per the adapter's no-retry policy.
pub struct SchedulerClient {
    http: reqwest::Client,
    config: SchedulerConfig,
    auth: SchedulerAuth,
    jobs: Arc<dyn JobTrackerBackend>,
}

impl SchedulerClient {
    pub fn new(config: SchedulerConfig, auth: SchedulerAuth, jobs: Arc<dyn JobTrackerBackend>) -> Self {
        Self { http: reqwest::Client::new(), config, auth, jobs }
    }

    /// Builds the submit envelope from `command`/`log_path`, posts it, and
    /// records the returned scheduler id against `job_id` via the job
    /// tracker.
    pub async fn submit_job(&self, job_id: &str, command: &str, log_path: &str) -> Result<String> {
        let token = self.auth.require_token()?;
        let descriptor = JobDescriptor::single_task(job_id, log_path, "/usr/bin:/bin", "/usr/lib:/usr/lib64");
        let envelope = JobSubmitRequest { job: descriptor, script: format!("#!/bin/bash\n{}", command) };

        let url = self.config.base_url.join(&format!("{}/job/submit", self.config.submit_api_path))?;
        let response = self
            .http
            .post(url)
            .header("X-SLURM-USER-TOKEN", token)
            .json(&envelope)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::SubmissionFailed(status.as_u16()));
        }

        let body: JobSubmitResponse = response.json().await?;
        let scheduler_job_id = body.job_id.ok_or(Error::MissingJobId)?;
        self.jobs.store_job_mapping(job_id, &scheduler_job_id)?;
        tracing::info!(job_id, scheduler_job_id, "submitted job");
        Ok(scheduler_job_id)
    }

    /// Resolves the scheduler id, polls status, and maps the cluster state
    /// onto the domain `JobStatus`.
    pub async fn get_job_status(&self, job_id: &str) -> Result<JobStatus> {
        let token = self.auth.require_token()?;
        let scheduler_job_id = self.jobs.get_scheduler_job_id(job_id)?;

        let url = self.config.base_url.join(&format!("{}/job/{}", self.config.api_path, scheduler_job_id))?;
        let response =
            self.http.get(url).header("X-SLURM-USER-TOKEN", token).send().await?;
        if !response.status().is_success() {
            return Err(Error::JobStatusNotFound);
        }

        let body: JobStatusResponse = response.json().await?;
        let entry = body.jobs.iter().find(|entry| entry.name == job_id).ok_or(Error::JobStatusNotFound)?;
        Ok(JobStatus::from(entry.state.current.clone()))
    }

    pub async fn cancel_job(&self, job_id: &str) -> Result<()> {
        let token = self.auth.require_token()?;
        let scheduler_job_id = self.jobs.get_scheduler_job_id(job_id)?;

        let url = self.config.base_url.join(&format!("{}/job/{}", self.config.api_path, scheduler_job_id))?;
        let response =
            self.http.delete(url).header("X-SLURM-USER-TOKEN", token).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::CancelFailed(status.as_u16()));
        }
        Ok(())
    }
}
