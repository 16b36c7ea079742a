//! Job data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Paused,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Paused => "paused",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// A restore job, tracking one (plan_id, plan_hash) through its lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: String,
    pub tenant_id: String,
    pub instance_id: String,
    pub source: String,
    pub plan_id: String,
    pub plan_hash: String,
    pub status: JobStatus,
    pub status_reason_code: String,
    pub wait_reason_code: Option<String>,
    pub required_capabilities: Vec<String>,
    pub lock_scope_tables: Vec<String>,
    pub requested_by: String,
    #[serde(with = "crate::canonical::iso8601")]
    pub requested_at: DateTime<Utc>,
    #[serde(with = "crate::canonical::iso8601_option")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(with = "crate::canonical::iso8601_option")]
    pub completed_at: Option<DateTime<Utc>>,
    pub queue_position: Option<usize>,
}

impl Job {
    pub fn matches_scope(&self, tenant_id: &str, instance_id: &str, source: &str) -> bool {
        self.tenant_id == tenant_id && self.instance_id == instance_id && self.source == source
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJobRequest {
    pub tenant_id: String,
    pub instance_id: String,
    pub source: String,
    pub plan_id: String,
    pub plan_hash: String,
    pub lock_scope_tables: Vec<String>,
    pub required_capabilities: Vec<String>,
    pub requested_by: String,
}

/// Per-job event log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEvent {
    pub event_id: String,
    pub job_id: String,
    pub phase: String,
    pub action: String,
    pub outcome: String,
    pub reason_code: String,
    #[serde(with = "crate::canonical::iso8601")]
    pub at: DateTime<Utc>,
}

/// Normalized cross-service projection of a [`JobEvent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossServiceEvent {
    pub contract_version: String,
    pub schema_version: String,
    pub service: String,
    pub tenant_id: String,
    pub instance_id: String,
    pub source: String,
    pub plan_id: String,
    pub job_id: String,
    pub lifecycle: String,
    pub action: String,
    pub outcome: String,
    pub reason_code: String,
    #[serde(with = "crate::canonical::iso8601")]
    pub at: DateTime<Utc>,
}

/// Persisted container for `job_state`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct JobState {
    pub jobs: HashMap<String, Job>,
    pub events_by_job_id: HashMap<String, Vec<JobEvent>>,
}
