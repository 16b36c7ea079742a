//! Execution data model.

use crate::plan::{ConflictClass, Resolution};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Running,
    Paused,
    Completed,
    Failed,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionStatus::Completed | ExecutionStatus::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkMode {
    Normal,
    RowFallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: String,
    pub chunk_index: u32,
    pub row_ids: Vec<String>,
    pub mode: ChunkMode,
    pub applied_count: u32,
    pub skipped_count: u32,
    pub failed_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowOutcomeKind {
    Applied,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowOutcome {
    pub row_id: String,
    pub chunk_id: String,
    pub outcome: RowOutcomeKind,
    pub reason_code: String,
    pub attempt: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaOutcomeKind {
    Applied,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaOutcome {
    pub candidate_id: String,
    pub outcome: MediaOutcomeKind,
    pub reason_code: String,
    pub attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub checkpoint_id: String,
    pub next_chunk_index: u32,
    pub total_chunks: u32,
    pub last_chunk_id: Option<String>,
    pub row_attempt_by_row: HashMap<String, u32>,
    #[serde(with = "crate::canonical::iso8601")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub applied_rows: u64,
    pub skipped_rows: u64,
    pub failed_rows: u64,
    pub applied_media: u64,
    pub skipped_media: u64,
    pub failed_media: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackJournalEntry {
    pub journal_id: String,
    pub job_id: String,
    pub plan_row_id: String,
    pub table: String,
    pub record_sys_id: String,
    pub action: String,
    pub before_image_enc: Option<String>,
    pub chunk_id: String,
    pub row_attempt: u32,
    pub executed_by: String,
    #[serde(with = "crate::canonical::iso8601")]
    pub executed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorEntry {
    pub mirror_id: String,
    pub journal_id: String,
    pub job_id: String,
    pub plan_row_id: String,
    pub table: String,
    pub record_sys_id: String,
    pub outcome: String,
    pub reason_code: String,
    #[serde(with = "crate::canonical::iso8601")]
    pub linked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConflict {
    pub conflict_id: String,
    pub row_id: String,
    pub class: ConflictClass,
    pub resolution: Option<Resolution>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowOptions {
    pub mode: String,
    #[serde(default)]
    pub allowlist: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElevatedConfirmation {
    pub confirmed: bool,
    pub confirmation: String,
    pub reason: String,
}

impl ElevatedConfirmation {
    pub fn is_valid(&self) -> bool {
        self.confirmed && self.confirmation == "I UNDERSTAND" && !self.reason.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteJobRequest {
    pub operator_id: String,
    #[serde(default)]
    pub operator_capabilities: Vec<String>,
    pub chunk_size: Option<u32>,
    pub workflow: Option<WorkflowOptions>,
    #[serde(default)]
    pub runtime_conflicts: Vec<RuntimeConflict>,
    pub elevated_confirmation: Option<ElevatedConfirmation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeJobRequest {
    pub operator_id: String,
    #[serde(default)]
    pub operator_capabilities: Vec<String>,
    #[serde(default)]
    pub runtime_conflicts: Vec<RuntimeConflict>,
    pub expected_plan_checksum: Option<String>,
    pub expected_precondition_checksum: Option<String>,
}

/// Persisted, terminal-and-in-flight execution state for a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub job_id: String,
    pub plan_id: String,
    pub plan_hash: String,
    pub plan_checksum: String,
    pub precondition_checksum: String,
    pub status: ExecutionStatus,
    pub reason_code: String,
    pub chunk_size: u32,
    pub workflow_mode: String,
    pub workflow_allowlist: Vec<String>,
    pub capabilities_used: HashSet<String>,
    pub elevated_confirmation_used: bool,
    pub resume_attempt_count: u32,
    pub checkpoint: Checkpoint,
    pub summary: ExecutionSummary,
    pub chunks: Vec<Chunk>,
    pub row_outcomes: Vec<RowOutcome>,
    pub media_outcomes: Vec<MediaOutcome>,
}

/// Persisted container for `execution_state`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ExecutionState {
    pub records: HashMap<String, ExecutionRecord>,
    pub rollback_journal_by_job_id: HashMap<String, Vec<RollbackJournalEntry>>,
    pub mirror_by_job_id: HashMap<String, Vec<MirrorEntry>>,
}
